//! Build state and the affordability overlay.
//!
//! A [`Build`] is an immutable value: every manual selection returns a new
//! build. Affordability of replacement candidates is always derived from the
//! build passed in, so it tracks the running total after each override.

use crate::{
    core::part::{Budget, Category, Part},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One selected part per category plus the budget the build started from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    budget: Budget,
    #[serde(default)]
    parts: BTreeMap<Category, Part>,
}

impl Build {
    /// An empty build for the given budget.
    #[must_use]
    pub const fn empty(budget: Budget) -> Self {
        Self {
            budget,
            parts: BTreeMap::new(),
        }
    }

    pub(crate) const fn from_selections(budget: Budget, parts: BTreeMap<Category, Part>) -> Self {
        Self { budget, parts }
    }

    /// Budget the build was created for.
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// Selected part for a category, if any.
    #[must_use]
    pub fn selection(&self, category: Category) -> Option<&Part> {
        self.parts.get(&category)
    }

    /// Selections in category order.
    pub fn selections(&self) -> impl Iterator<Item = (Category, &Part)> {
        self.parts.iter().map(|(category, part)| (*category, part))
    }

    /// Number of filled categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no category has been filled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Checks a build that arrived from a client.
    ///
    /// Every part must sit under its own category and carry a valid price.
    ///
    /// # Errors
    /// - [`Error::Validation`] when a slot holds a part of another category
    /// - [`Error::InvalidAmount`] for a negative or non-finite price
    pub fn validate(&self) -> Result<()> {
        for (&slot, part) in &self.parts {
            if part.category != slot {
                return Err(Error::validation(format!(
                    "Part '{}' is a {} but was placed in the {slot} slot",
                    part.id, part.category
                )));
            }
            part.validate()?;
        }
        Ok(())
    }

    /// Categories that still need a part.
    #[must_use]
    pub fn missing_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| !self.parts.contains_key(category))
            .collect()
    }

    /// Sum of all selected prices.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.parts.values().map(|part| part.price).sum()
    }

    /// Budget left after the current selections; `None` when unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<f64> {
        match self.budget {
            Budget::Limited(total) => Some(total - self.total_price()),
            Budget::Unlimited => None,
        }
    }

    /// Returns a new build with `part` in its category, replacing any previous pick.
    #[must_use]
    pub fn with_selection(&self, part: Part) -> Self {
        let mut parts = self.parts.clone();
        parts.insert(part.category, part);
        Self {
            budget: self.budget,
            parts,
        }
    }

    /// Returns a new build with the category cleared.
    #[must_use]
    pub fn without(&self, category: Category) -> Self {
        let mut parts = self.parts.clone();
        parts.remove(&category);
        Self {
            budget: self.budget,
            parts,
        }
    }

    /// Budget available for `category` if its current pick were swapped out.
    ///
    /// `budget - (total - current_category_price)`; a category with no pick
    /// contributes zero. `None` when unlimited.
    #[must_use]
    pub fn remaining_if_replaced(&self, category: Category) -> Option<f64> {
        match self.budget {
            Budget::Limited(total) => {
                let current = self.selection(category).map_or(0.0, |part| part.price);
                Some(total - (self.total_price() - current))
            }
            Budget::Unlimited => None,
        }
    }

    /// Whether `candidate` fits in place of the current pick for its category.
    #[must_use]
    pub fn is_affordable(&self, candidate: &Part) -> bool {
        self.remaining_if_replaced(candidate.category)
            .is_none_or(|remaining| candidate.price <= remaining)
    }

    /// Flags every candidate for `category` with its affordability.
    ///
    /// Recomputed from the current selections on every call.
    #[must_use]
    pub fn replacement_options(&self, category: Category, candidates: &[Part]) -> ReplacementOptions {
        let remaining = self.remaining_if_replaced(category);
        let options = candidates
            .iter()
            .map(|part| PricedOption {
                affordable: remaining.is_none_or(|remaining| part.price <= remaining),
                part: part.clone(),
            })
            .collect();

        ReplacementOptions {
            category,
            remaining_if_replaced: remaining,
            current: self.selection(category).cloned(),
            options,
        }
    }

    /// Totals for display.
    #[must_use]
    pub fn summary(&self) -> BuildSummary {
        let total_price = self.total_price();
        let remaining = self.remaining();
        let spent_percent = match self.budget {
            Budget::Limited(total) => Some(calculate_spent_percent(total_price, total)),
            Budget::Unlimited => None,
        };

        BuildSummary {
            budget: self.budget,
            total_price,
            remaining,
            over_budget: remaining.is_some_and(|remaining| remaining < 0.0),
            spent_percent,
            missing: self.missing_categories(),
        }
    }
}

/// A candidate together with whether it fits the remaining budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedOption {
    /// The candidate part
    #[serde(flatten)]
    pub part: Part,
    /// `true` when the budget is unlimited or the price fits
    pub affordable: bool,
}

/// Result of the affordability overlay for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementOptions {
    /// Category being replaced
    pub category: Category,
    /// Budget available for this category; absent when unlimited
    pub remaining_if_replaced: Option<f64>,
    /// Current pick, if any
    pub current: Option<Part>,
    /// Every candidate with its affordability flag
    pub options: Vec<PricedOption>,
}

/// Totals shown next to a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    /// Originating budget
    pub budget: Budget,
    /// Sum of selected prices
    pub total_price: f64,
    /// Budget minus total; absent when unlimited
    pub remaining: Option<f64>,
    /// Whether the total exceeds a limited budget
    pub over_budget: bool,
    /// Share of the budget used, 0-100; absent when unlimited
    pub spent_percent: Option<f64>,
    /// Categories without a pick
    pub missing: Vec<Category>,
}

/// Percentage of `budget` consumed by `total`, capped at 100.
///
/// A zero budget yields 0.
#[must_use]
pub fn calculate_spent_percent(total: f64, budget: f64) -> f64 {
    if budget <= 0.0 {
        return 0.0;
    }

    (total / budget * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn part(id: &str, price: f64, category: Category) -> Part {
        Part::new(id, format!("Part {id}"), "Test", price, category)
    }

    /// Total 900: cpu 300, gpu 400, ram 100, case 100.
    fn build_at_900() -> Build {
        Build::empty(Budget::Limited(1000.0))
            .with_selection(part("cpu", 300.0, Category::Cpu))
            .with_selection(part("gpu", 400.0, Category::Gpu))
            .with_selection(part("ram", 100.0, Category::Ram))
            .with_selection(part("case", 100.0, Category::Case))
    }

    fn case_options() -> Vec<Part> {
        [46.0, 79.0, 106.0, 133.0, 159.0, 199.0]
            .iter()
            .enumerate()
            .map(|(i, price)| part(&format!("case-{i}"), *price, Category::Case))
            .collect()
    }

    #[test]
    fn test_replacing_case_recomputes_remaining() {
        let build = build_at_900();
        assert_eq!(build.total_price(), 900.0);
        assert_eq!(build.remaining_if_replaced(Category::Case), Some(200.0));

        let overlay = build.replacement_options(Category::Case, &case_options());
        assert_eq!(overlay.remaining_if_replaced, Some(200.0));
        assert!(overlay.options.iter().all(|option| option.affordable));
        assert!(overlay
            .options
            .iter()
            .any(|option| option.part.price == 199.0 && option.affordable));
        assert_eq!(overlay.current.unwrap().id, "case");
    }

    #[test]
    fn test_overlay_changes_after_each_override() {
        let build = build_at_900().with_selection(part("gpu-big", 550.0, Category::Gpu));
        assert_eq!(build.total_price(), 1050.0);
        assert_eq!(build.remaining_if_replaced(Category::Case), Some(50.0));

        let overlay = build.replacement_options(Category::Case, &case_options());
        let affordable: Vec<f64> = overlay
            .options
            .iter()
            .filter(|option| option.affordable)
            .map(|option| option.part.price)
            .collect();
        assert_eq!(affordable, vec![46.0]);
    }

    #[test]
    fn test_unlimited_budget_makes_everything_affordable() {
        let build = Build::empty(Budget::Unlimited)
            .with_selection(part("gpu", 1333.0, Category::Gpu))
            .with_selection(part("cpu", 666.0, Category::Cpu));
        assert_eq!(build.remaining(), None);
        assert_eq!(build.remaining_if_replaced(Category::Gpu), None);

        for category in Category::ALL {
            let candidates = vec![part("cheap", 1.0, category), part("huge", 1_000_000.0, category)];
            let overlay = build.replacement_options(category, &candidates);
            assert!(overlay.options.iter().all(|option| option.affordable));
        }
        assert!(build.is_affordable(&part("any", 5_000_000.0, Category::Case)));
    }

    #[test]
    fn test_step_by_step_uses_remaining_budget() {
        let build = Build::empty(Budget::Limited(1000.0)).with_selection(part("cpu", 600.0, Category::Cpu));
        assert_eq!(build.remaining_if_replaced(Category::Gpu), Some(400.0));
        assert!(build.is_affordable(&part("gpu-1", 400.0, Category::Gpu)));
        assert!(!build.is_affordable(&part("gpu-2", 400.01, Category::Gpu)));
    }

    #[test]
    fn test_with_selection_leaves_original_untouched() {
        let original = build_at_900();
        let updated = original.with_selection(part("case-2", 46.0, Category::Case));
        assert_eq!(original.selection(Category::Case).unwrap().price, 100.0);
        assert_eq!(updated.selection(Category::Case).unwrap().price, 46.0);
        assert_eq!(updated.len(), original.len());

        let cleared = updated.without(Category::Case);
        assert!(cleared.selection(Category::Case).is_none());
        assert_eq!(cleared.total_price(), 800.0);
    }

    #[test]
    fn test_summary_reports_over_budget() {
        let build = build_at_900().with_selection(part("gpu-big", 550.0, Category::Gpu));
        let summary = build.summary();
        assert_eq!(summary.total_price, 1050.0);
        assert_eq!(summary.remaining, Some(-50.0));
        assert!(summary.over_budget);
        assert_eq!(summary.spent_percent, Some(100.0));
        assert_eq!(
            summary.missing,
            vec![Category::Motherboard, Category::Storage, Category::Psu]
        );
    }

    #[test]
    fn test_summary_unlimited() {
        let summary = Build::empty(Budget::Unlimited).summary();
        assert_eq!(summary.remaining, None);
        assert_eq!(summary.spent_percent, None);
        assert!(!summary.over_budget);
        assert_eq!(summary.missing.len(), 7);
    }

    #[test]
    fn test_calculate_spent_percent() {
        assert_eq!(calculate_spent_percent(500.0, 1000.0), 50.0);
        assert_eq!(calculate_spent_percent(1500.0, 1000.0), 100.0);
        assert_eq!(calculate_spent_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_validate_rejects_part_in_wrong_slot() {
        let json = serde_json::json!({
            "budget": 1000.0,
            "parts": {
                "case": { "id": "gpu-1", "name": "GPU", "brand": "Acme", "price": 700.0, "category": "gpu" }
            }
        });
        let build: Build = serde_json::from_value(json).unwrap();

        assert!(matches!(build.validate(), Err(Error::Validation { message: _ })));
    }

    #[test]
    fn test_validate_rejects_bad_price() {
        let mut build = build_at_900();
        build.parts.get_mut(&Category::Cpu).unwrap().price = -1.0;

        assert!(matches!(build.validate(), Err(Error::InvalidAmount { .. })));
        assert!(build_at_900().validate().is_ok());
    }

    #[test]
    fn test_build_json_round_trip_keeps_selections() {
        let build = build_at_900();
        let json = serde_json::to_value(&build).unwrap();
        assert_eq!(json["budget"], 1000.0);
        assert_eq!(json["parts"]["case"]["price"], 100.0);
        let parsed: Build = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, build);
    }
}
