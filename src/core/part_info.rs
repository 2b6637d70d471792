//! Derived product information: spec summaries, price tiers and recommendation text.

use crate::core::part::Category;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Patterns pulled out of a product title, in display order.
static SPEC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d+C/\d+T)\b",
        r"(?i)\b(\d+(?:\.\d+)?\s*GHz)\b",
        r"(?i)\b(\d+\s*GB(?:\s*GDDR\d+X?)?)\b",
        r"(?i)\b(DDR\d)\b",
        r"(?i)\b(\d+\s*MHz)\b",
        r"(?i)\b(\d+\s*TB)\b",
        r"(?i)\b(NVMe|PCIe|SATA)\b",
        r"(?i)\b(\d{3,4}\s*W)\b",
        r"(?i)(80\+\s*(?:Bronze|Silver|Gold|Platinum|Titanium))",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Placeholder when nothing could be extracted.
pub const NO_SPECS: &str = "See product page for full specifications";

/// Pulls a short comma-separated spec summary out of a product title.
///
/// Each pattern contributes at most its first match.
#[must_use]
pub fn extract_specs(name: &str) -> String {
    let specs: Vec<&str> = SPEC_PATTERNS
        .iter()
        .filter_map(|pattern| pattern.captures(name))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .collect();

    if specs.is_empty() {
        NO_SPECS.to_string()
    } else {
        specs.join(", ")
    }
}

/// Rough price bracket used for recommendation copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    /// Under 100
    Budget,
    /// 100 to under 300
    Mid,
    /// 300 to under 600
    High,
    /// 600 and up
    Premium,
}

impl PriceTier {
    /// Bracket for a price.
    #[must_use]
    pub fn for_price(price: f64) -> Self {
        if price < 100.0 {
            Self::Budget
        } else if price < 300.0 {
            Self::Mid
        } else if price < 600.0 {
            Self::High
        } else {
            Self::Premium
        }
    }
}

/// One-sentence recommendation for a part in a category at a price.
#[must_use]
pub const fn recommendation(category: Category, tier: PriceTier) -> &'static str {
    use PriceTier::{Budget, High, Mid, Premium};

    match (category, tier) {
        (Category::Cpu, Budget) => "Great value for everyday use",
        (Category::Cpu, Mid) => "Solid gaming processor with strong multi-threading",
        (Category::Cpu, High) => "Top performance for gaming and creative work",
        (Category::Cpu, Premium) => "Among the most powerful processors available",
        (Category::Gpu, Budget) => "Good for 1080p gaming",
        (Category::Gpu, Mid) => "Great for 1440p gaming on high settings",
        (Category::Gpu, High) => "Excellent 4K gaming performance",
        (Category::Gpu, Premium) => "Extreme performance, the best of the best",
        (Category::Ram, Budget) => "Enough memory for gaming",
        (Category::Ram, Mid) => "Good balance of capacity and speed",
        (Category::Ram, High) => "Plenty of fast memory for demanding work",
        (Category::Ram, Premium) => "Maximum capacity for professional workloads",
        (Category::Motherboard, Budget) => "Entry board with the essentials",
        (Category::Motherboard, Mid) => "Good foundation with modern features",
        (Category::Motherboard, High) => "Premium features and expandability",
        (Category::Motherboard, Premium) => "Flagship board with everything and more",
        (Category::Storage, Budget) => "Fast NVMe storage for the OS and main programs",
        (Category::Storage, Mid) => "Good balance of capacity and speed",
        (Category::Storage, High) => "Top speeds and large capacity",
        (Category::Storage, Premium) => "Maximum performance, the fastest drives",
        (Category::Psu, Budget) => "Reliable power for basic systems",
        (Category::Psu, Mid) => "Quality power supply with a good efficiency rating",
        (Category::Psu, High) => "Premium high-efficiency power supply",
        (Category::Psu, Premium) => "Maximum power and efficiency",
        (Category::Case, Budget) => "Functional case with decent airflow",
        (Category::Case, Mid) => "Clean design and easy cable management",
        (Category::Case, High) => "Premium materials and excellent airflow",
        (Category::Case, Premium) => "Showcase design for displaying components",
    }
}
