use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

/// The nine fixed buckets shopping items are filed under.
///
/// Labels outside the set are read back as [`ShoppingCategory::Other`] so a
/// list written by another client still loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ShoppingCategory {
    #[serde(rename = "Kött & Fisk")]
    MeatAndFish,
    #[serde(rename = "Mejeri")]
    Dairy,
    #[serde(rename = "Frukt & Grönt")]
    FruitAndVegetables,
    #[serde(rename = "Torrvaror")]
    DryGoods,
    #[serde(rename = "Fryst")]
    Frozen,
    #[serde(rename = "Godis & Snacks")]
    Snacks,
    #[serde(rename = "Hygien")]
    Hygiene,
    #[serde(rename = "Hushåll")]
    Household,
    #[serde(rename = "Övrigt")]
    #[default]
    Other,
}

impl ShoppingCategory {
    /// Display order.
    pub const ALL: [ShoppingCategory; 9] = [
        Self::MeatAndFish,
        Self::Dairy,
        Self::FruitAndVegetables,
        Self::DryGoods,
        Self::Frozen,
        Self::Snacks,
        Self::Hygiene,
        Self::Household,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeatAndFish => "Kött & Fisk",
            Self::Dairy => "Mejeri",
            Self::FruitAndVegetables => "Frukt & Grönt",
            Self::DryGoods => "Torrvaror",
            Self::Frozen => "Fryst",
            Self::Snacks => "Godis & Snacks",
            Self::Hygiene => "Hygien",
            Self::Household => "Hushåll",
            Self::Other => "Övrigt",
        }
    }

    /// Common items offered for one-key adding.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::MeatAndFish => &["Kyckling", "Lax", "Köttfärs", "Bacon", "Korv"],
            Self::Dairy => &["Mjölk", "Ägg", "Smör", "Ost", "Yoghurt", "Grädde"],
            Self::FruitAndVegetables => {
                &["Bananer", "Äpplen", "Gurka", "Tomater", "Potatis", "Lök"]
            }
            Self::DryGoods => &["Pasta", "Ris", "Bröd", "Havregryn", "Linser"],
            Self::Frozen => &["Frysta bär", "Fryst kyckling", "Glass", "Frysta grönsaker"],
            Self::Snacks => &["Chips", "Choklad", "Kex", "Nötter"],
            Self::Hygiene => &["Tandkräm", "Schampo", "Tvål", "Deodorant"],
            Self::Household => &["Diskmedel", "Toapapper", "Pappershanddukar"],
            Self::Other => &["Batterier", "Ljus", "Blommor"],
        }
    }

    /// Next category in display order, wrapping at the end.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ShoppingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShoppingCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("invalid shopping category: {s}"))
    }
}

impl From<String> for ShoppingCategory {
    fn from(label: String) -> Self {
        label.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub category: ShoppingCategory,
    pub completed: bool,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

impl ShoppingItem {
    pub fn new(input: NewShoppingItem, added_by: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: input.name,
            quantity: input.quantity,
            category: input.category,
            completed: false,
            added_by: added_by.into(),
            created_at: Utc::now(),
        }
    }
}

/// User-supplied fields of an item before it is attributed and stamped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewShoppingItem {
    pub name: String,
    pub quantity: Option<String>,
    pub category: ShoppingCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: String,
    pub name: String,
    pub items: Vec<ShoppingItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CreateShoppingListInput {
    pub name: String,
    pub items: Vec<ShoppingItem>,
}

#[derive(Default)]
pub struct UpdateShoppingListInput {
    pub name: Option<String>,
    pub items: Option<Vec<ShoppingItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_to_label() {
        let json = serde_json::to_string(&ShoppingCategory::FruitAndVegetables).unwrap();
        assert_eq!(json, r#""Frukt & Grönt""#);
    }

    #[test]
    fn test_category_parses_label() {
        let cat: ShoppingCategory = serde_json::from_str(r#""Mejeri""#).unwrap();
        assert_eq!(cat, ShoppingCategory::Dairy);
    }

    #[test]
    fn test_unknown_category_falls_back_to_other() {
        let cat: ShoppingCategory = serde_json::from_str(r#""Bageri""#).unwrap();
        assert_eq!(cat, ShoppingCategory::Other);
        assert!("Bageri".parse::<ShoppingCategory>().is_err());
    }

    #[test]
    fn test_next_wraps_around() {
        assert_eq!(ShoppingCategory::MeatAndFish.next(), ShoppingCategory::Dairy);
        assert_eq!(ShoppingCategory::Other.next(), ShoppingCategory::MeatAndFish);
    }

    #[test]
    fn test_every_category_has_suggestions() {
        for cat in ShoppingCategory::ALL {
            assert!(!cat.suggestions().is_empty(), "{cat} has no suggestions");
        }
    }

    #[test]
    fn test_item_omits_missing_quantity() {
        let item = ShoppingItem::new(
            NewShoppingItem {
                name: "Mjölk".to_string(),
                quantity: None,
                category: ShoppingCategory::Dairy,
            },
            "Eva",
        );
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("quantity").is_none());
        assert_eq!(value["addedBy"], "Eva");
        assert_eq!(value["category"], "Mejeri");
        assert!(value.get("createdAt").is_some());
    }
}
