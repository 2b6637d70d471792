//! Build vocabulary - categories, parts and budgets.
//!
//! A build has one slot per [`Category`]. Each slot is filled with a [`Part`]
//! chosen from a candidate list, either automatically by the allocator or
//! manually by the user. A [`Budget`] is either a positive amount or
//! unlimited.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Budget amount at or above which a budget is treated as unlimited.
///
/// Clients send this value for the "no limit" preset.
pub const UNLIMITED_BUDGET: f64 = 999_999.0;

/// One slot in a computer build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Processor
    Cpu,
    /// Motherboard
    Motherboard,
    /// Graphics card
    Gpu,
    /// Memory
    Ram,
    /// SSD / HDD storage
    Storage,
    /// Power supply
    Psu,
    /// Chassis
    Case,
}

impl Category {
    /// Every category, in the order the guided picker walks through them.
    pub const ALL: [Self; 7] = [
        Self::Cpu,
        Self::Motherboard,
        Self::Gpu,
        Self::Ram,
        Self::Storage,
        Self::Psu,
        Self::Case,
    ];

    /// Short identifier used in URLs, JSON keys and config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Motherboard => "motherboard",
            Self::Gpu => "gpu",
            Self::Ram => "ram",
            Self::Storage => "storage",
            Self::Psu => "psu",
            Self::Case => "case",
        }
    }

    /// Human-readable label for the picker step.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "Processor",
            Self::Motherboard => "Motherboard",
            Self::Gpu => "Graphics card",
            Self::Ram => "Memory",
            Self::Storage => "Storage",
            Self::Psu => "Power supply",
            Self::Case => "Case",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" | "processor" => Ok(Self::Cpu),
            "motherboard" => Ok(Self::Motherboard),
            "gpu" => Ok(Self::Gpu),
            "ram" | "memory" => Ok(Self::Ram),
            "storage" | "ssd" => Ok(Self::Storage),
            "psu" => Ok(Self::Psu),
            "case" => Ok(Self::Case),
            _ => Err(Error::UnknownCategory {
                name: s.to_string(),
            }),
        }
    }
}

/// Descriptive fields carried along with a part. The allocator never reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartDetails {
    /// Short spec summary, e.g. "6C/12T, 4.4GHz"
    pub specs: String,
    /// Price before discount
    pub list_price: Option<f64>,
    /// Discount in percent
    pub discount_percent: Option<f64>,
    /// Product page
    pub url: String,
    /// Product image
    pub image: String,
    /// Whether the retailer reports stock
    pub in_stock: bool,
    /// Units in stock, if known
    pub stock: u32,
    /// Retailer description
    pub description: String,
    /// Why this part is recommended
    pub reason: Option<String>,
}

/// One purchasable item belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Catalog identifier
    pub id: String,
    /// Product name
    pub name: String,
    /// Manufacturer
    pub brand: String,
    /// Price the buyer pays; finite and non-negative
    pub price: f64,
    /// Slot this part fills
    pub category: Category,
    /// Pass-through descriptive fields
    #[serde(default)]
    pub details: PartDetails,
}

impl Part {
    /// Creates a part with empty descriptive fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        brand: impl Into<String>,
        price: f64,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: brand.into(),
            price,
            category,
            details: PartDetails::default(),
        }
    }

    /// Rejects prices that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }
        Ok(())
    }
}

/// Total spending limit for a build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// A positive amount
    Limited(f64),
    /// No limit; every part is affordable
    Unlimited,
}

impl Budget {
    /// Interprets a client-supplied amount.
    ///
    /// Amounts at or above [`UNLIMITED_BUDGET`] mean "no limit".
    ///
    /// # Errors
    /// Returns [`Error::InvalidBudget`] for zero, negative or non-finite amounts.
    pub fn from_amount(amount: f64) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidBudget { amount });
        }
        if amount >= UNLIMITED_BUDGET {
            return Ok(Self::Unlimited);
        }
        Ok(Self::Limited(amount))
    }

    /// The wire representation; unlimited becomes the sentinel.
    #[must_use]
    pub const fn amount(self) -> f64 {
        match self {
            Self::Limited(amount) => amount,
            Self::Unlimited => UNLIMITED_BUDGET,
        }
    }

    /// Whether this budget has no limit.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl Serialize for Budget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.amount())
    }
}

impl<'de> Deserialize<'de> for Budget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_amount(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("SSD".parse::<Category>().unwrap(), Category::Storage);
        assert!(matches!(
            "monitor".parse::<Category>(),
            Err(Error::UnknownCategory { name: _ })
        ));
    }

    #[test]
    fn test_budget_from_amount() {
        assert_eq!(Budget::from_amount(1000.0).unwrap(), Budget::Limited(1000.0));
        assert_eq!(Budget::from_amount(999_999.0).unwrap(), Budget::Unlimited);
        assert_eq!(Budget::from_amount(5_000_000.0).unwrap(), Budget::Unlimited);
        assert!(matches!(
            Budget::from_amount(0.0),
            Err(Error::InvalidBudget { amount: 0.0 })
        ));
        assert!(Budget::from_amount(-10.0).is_err());
        assert!(Budget::from_amount(f64::NAN).is_err());
        assert!(Budget::from_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_budget_json_uses_sentinel() {
        let json = serde_json::to_string(&Budget::Unlimited).unwrap();
        assert_eq!(json, "999999.0");
        let parsed: Budget = serde_json::from_str("1500").unwrap();
        assert_eq!(parsed, Budget::Limited(1500.0));
        assert!(serde_json::from_str::<Budget>("-1").is_err());
    }

    #[test]
    fn test_part_validate_rejects_bad_prices() {
        assert!(Part::new("1", "A", "B", 10.0, Category::Cpu).validate().is_ok());
        assert!(Part::new("1", "A", "B", 0.0, Category::Cpu).validate().is_ok());
        assert!(matches!(
            Part::new("1", "A", "B", -1.0, Category::Cpu).validate(),
            Err(Error::InvalidAmount { amount: -1.0 })
        ));
        assert!(Part::new("1", "A", "B", f64::NAN, Category::Cpu)
            .validate()
            .is_err());
    }

    #[test]
    fn test_part_details_default_when_missing() {
        let part: Part = serde_json::from_str(
            r#"{"id":"1","name":"Ryzen 5 5600","brand":"AMD","price":139.0,"category":"cpu"}"#,
        )
        .unwrap();
        assert_eq!(part.details, PartDetails::default());
        assert_eq!(part.category, Category::Cpu);
    }
}
