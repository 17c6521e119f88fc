//! Product listing sort orders.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How a product listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Cheapest first.
    PriceLowToHigh,
    /// Most expensive first.
    PriceHighToLow,
    /// Alphabetical by name.
    #[serde(rename = "name_a_to_z")]
    NameAToZ,
    /// Reverse alphabetical by name.
    #[serde(rename = "name_z_to_a")]
    NameZToA,
}

impl SortOption {
    /// All sort options in display order.
    pub const ALL: [Self; 4] = [
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::NameAToZ,
        Self::NameZToA,
    ];

    /// Wire name of the option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceLowToHigh => "price_low_to_high",
            Self::PriceHighToLow => "price_high_to_low",
            Self::NameAToZ => "name_a_to_z",
            Self::NameZToA => "name_z_to_a",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.as_str() == s)
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for option in SortOption::ALL {
            let json = serde_json::to_string(&option).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", option.as_str()));
            assert_eq!(SortOption::parse(option.as_str()), Some(option));
        }
        assert_eq!(SortOption::parse("rating"), None);
    }
}
