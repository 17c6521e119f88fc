//! Catalog category record.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A product category.
///
/// Products reference categories by [`Category::name`]. A disabled category
/// stays in the catalog but is hidden from the listing facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    #[serde(rename = "categoryName")]
    pub name: String,
    #[serde(rename = "categoryImage", default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Category {
    /// Whether products in this category are offered in the listing facets.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_seed_record() {
        let category: Category = serde_json::from_str(
            r#"{
                "_id": "recBohCqQsot4Q4II",
                "categoryName": "office",
                "categoryImage": "https://example.com/office.jpeg",
                "description": "Desks and chairs",
                "id": "1",
                "disabled": false
            }"#,
        )
        .unwrap();
        assert_eq!(category.name, "office");
        assert!(category.is_enabled());
    }

    #[test]
    fn test_disabled_defaults_to_false() {
        let category: Category =
            serde_json::from_str(r#"{"_id": "c1", "categoryName": "kids"}"#).unwrap();
        assert!(category.is_enabled());
    }
}
