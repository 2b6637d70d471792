//! Store search links for a component.
//!
//! Stock is not queried; each result is a ready-made search URL at a known
//! retailer so the user can compare prices.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;

/// (store name, search page, query parameter)
const RETAILERS: [(&str, &str, &str); 6] = [
    ("Informatika", "https://informatika.hr/search", "q"),
    ("Santa Domenica", "https://santadomenica.hr/pretraga", "q"),
    ("Links.hr", "https://links.hr/hr/pretraga", "q"),
    ("Nabava.net", "https://nabava.net/", "s"),
    ("ADM.hr", "https://adm.hr/search", "q"),
    ("eKupi.hr", "https://ekupi.hr/search", "q"),
];

/// A search link at one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreLink {
    /// Store name
    pub store: String,
    /// Search URL for the component
    pub url: String,
}

/// Search links for one component.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    /// "brand model"
    pub component: String,
    /// One link per store
    pub results: Vec<StoreLink>,
    /// When the report was produced
    pub timestamp: DateTime<Utc>,
}

/// Builds search links for `brand model` at every known store.
///
/// # Errors
/// Returns [`Error::Validation`] when brand or model is blank.
pub fn check_availability(brand: &str, model: &str) -> Result<AvailabilityReport> {
    let (brand, model) = (brand.trim(), model.trim());
    if brand.is_empty() || model.is_empty() {
        return Err(Error::validation("Brand and model are required"));
    }

    let component = format!("{brand} {model}");
    let results = RETAILERS
        .iter()
        .map(|(store, page, param)| {
            Url::parse_with_params(page, &[(*param, component.as_str())])
                .map(|url| StoreLink {
                    store: (*store).to_string(),
                    url: url.into(),
                })
                .map_err(|e| Error::Config {
                    message: format!("Invalid search page for {store}: {e}"),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AvailabilityReport {
        component,
        results,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_links_for_every_store() {
        let report = check_availability("AMD", "Ryzen 5 5600").unwrap();
        assert_eq!(report.component, "AMD Ryzen 5 5600");
        assert_eq!(report.results.len(), RETAILERS.len());
        assert_eq!(
            report.results[0].url,
            "https://informatika.hr/search?q=AMD+Ryzen+5+5600"
        );
    }

    #[test]
    fn test_requires_brand_and_model() {
        assert!(matches!(
            check_availability("", "RTX 4070"),
            Err(Error::Validation { message: _ })
        ));
        assert!(check_availability("NVIDIA", "  ").is_err());
    }

    #[test]
    fn test_query_is_form_encoded() {
        let report = check_availability("be quiet!", "Pure Power 12 M 750W 80+").unwrap();
        let nabava = report.results.iter().find(|link| link.store == "Nabava.net").unwrap();
        assert_eq!(
            nabava.url,
            "https://nabava.net/?s=be+quiet%21+Pure+Power+12+M+750W+80%2B"
        );
    }
}
