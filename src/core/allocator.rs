//! Budget allocator - one greedy pass that fills every category of a build.
//!
//! Each category receives a fixed share of the total budget (its weight). Within
//! a category the allocator picks the part priced closest to that share without
//! exceeding it, falling back to the cheapest part when nothing fits. Savings in
//! one category are not carried over to another.

use crate::{
    core::{
        build::Build,
        part::{Budget, Category, Part},
    },
    errors::{Error, Result},
};
use std::collections::BTreeMap;

/// Tolerance for "weights sum to 1.0".
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Tolerance for "price is at or below target".
const PRICE_EPSILON: f64 = 1e-9;

/// Fraction of the total budget assigned to each category.
///
/// Always valid once constructed: weights are finite, non-negative and sum to
/// 1.0 within [`WEIGHT_TOLERANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeights {
    weights: BTreeMap<Category, f64>,
}

impl CategoryWeights {
    /// Validates and wraps a weight table.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWeights`] if any weight is negative or not finite,
    /// or the weights do not sum to 1.0.
    pub fn new(weights: BTreeMap<Category, f64>) -> Result<Self> {
        if let Some((category, weight)) = weights
            .iter()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(Error::InvalidWeights {
                message: format!("weight for '{category}' must be a non-negative number, got {weight}"),
            });
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::InvalidWeights {
                message: format!("weights must sum to 1.0, got {sum}"),
            });
        }

        Ok(Self { weights })
    }

    /// Weight of a category; categories missing from the table weigh nothing.
    #[must_use]
    pub fn weight(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }

    /// Spending goal for a category under a limited budget.
    #[must_use]
    pub fn target(&self, total_budget: f64, category: Category) -> f64 {
        total_budget * self.weight(category)
    }

    /// Iterates the weight table in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(category, weight)| (*category, *weight))
    }
}

impl Default for CategoryWeights {
    /// The standard split: graphics card 35%, processor 20%, motherboard and
    /// memory 10% each, power supply 9%, storage and case 8% each.
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Category::Cpu, 0.20),
                (Category::Motherboard, 0.10),
                (Category::Gpu, 0.35),
                (Category::Ram, 0.10),
                (Category::Storage, 0.08),
                (Category::Psu, 0.09),
                (Category::Case, 0.08),
            ]),
        }
    }
}

/// Fills one slot per category present in `candidates`.
///
/// With a limited budget every category gets `budget * weight` as its target
/// and [`pick_nearest_under`] chooses the part. With an unlimited budget the
/// most expensive candidate of each category is suggested.
///
/// # Errors
/// - [`Error::EmptyCandidates`] if any category has no candidates
/// - [`Error::InvalidAmount`] if any candidate has a negative or non-finite price
pub fn allocate(
    budget: Budget,
    weights: &CategoryWeights,
    candidates: &BTreeMap<Category, Vec<Part>>,
) -> Result<Build> {
    let mut selections = BTreeMap::new();

    for (&category, parts) in candidates {
        for part in parts {
            part.validate()?;
        }

        let chosen = match budget {
            Budget::Limited(total) => pick_nearest_under(parts, weights.target(total, category)),
            Budget::Unlimited => pick_most_expensive(parts),
        }
        .ok_or(Error::EmptyCandidates { category })?;

        selections.insert(category, chosen.clone());
    }

    Ok(Build::from_selections(budget, selections))
}

/// Picks the part priced closest to `target` without exceeding it.
///
/// Ties keep the first part encountered. When every part is above `target`,
/// the cheapest part is returned instead. Returns `None` only for an empty
/// slice.
#[must_use]
pub fn pick_nearest_under(parts: &[Part], target: f64) -> Option<&Part> {
    let under_target = parts
        .iter()
        .filter(|part| part.price <= target + PRICE_EPSILON)
        .fold(None::<&Part>, |best, part| match best {
            Some(best) if best.price >= part.price => Some(best),
            _ => Some(part),
        });

    under_target.or_else(|| pick_cheapest(parts))
}

/// Cheapest part, first encountered on ties.
#[must_use]
pub fn pick_cheapest(parts: &[Part]) -> Option<&Part> {
    parts.iter().fold(None, |best, part| match best {
        Some(best) if best.price <= part.price => Some(best),
        _ => Some(part),
    })
}

fn pick_most_expensive(parts: &[Part]) -> Option<&Part> {
    parts.iter().fold(None, |best, part| match best {
        Some(best) if best.price >= part.price => Some(best),
        _ => Some(part),
    })
}
