//! Post-victory drop bundles
//!
//! The bundle mirrors the loot service's wire shape (camelCase field
//! names). A bundle is immutable once received; the caller folds it into a
//! session-level accumulator with [`DropBundle::merge`].

use serde::{Deserialize, Serialize};

/// Everything a victory yields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropBundle {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub items: Vec<DropItem>,
    #[serde(default)]
    pub cards: Vec<DropCard>,
}

impl DropBundle {
    /// Fold another bundle into this accumulator
    pub fn merge(&mut self, other: DropBundle) {
        self.gold += other.gold;
        self.exp += other.exp;
        self.items.extend(other.items);
        self.cards.extend(other.cards);
    }

    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.exp == 0 && self.items.is_empty() && self.cards.is_empty()
    }
}

/// A dropped inventory item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropItem {
    pub name: String,
}

/// A dropped collectible card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCard {
    pub title: String,
    #[serde(default)]
    pub bonus: CardBonus,
}

/// Multipliers a card grants on future task completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBonus {
    #[serde(default = "default_multiplier")]
    pub experience_multiplier: f64,
    #[serde(default = "default_multiplier")]
    pub gold_multiplier: f64,
}

impl Default for CardBonus {
    fn default() -> Self {
        CardBonus {
            experience_multiplier: 1.0,
            gold_multiplier: 1.0,
        }
    }
}

fn default_multiplier() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates() {
        let mut total = DropBundle::default();
        total.merge(DropBundle {
            gold: 50,
            exp: 120,
            items: vec![DropItem {
                name: "Health Potion".to_string(),
            }],
            cards: vec![],
        });
        total.merge(DropBundle {
            gold: 25,
            exp: 30,
            items: vec![],
            cards: vec![DropCard {
                title: "Morning Run".to_string(),
                bonus: CardBonus::default(),
            }],
        });

        assert_eq!(total.gold, 75);
        assert_eq!(total.exp, 150);
        assert_eq!(total.items.len(), 1);
        assert_eq!(total.cards.len(), 1);
        assert!(!total.is_empty());
    }

    #[test]
    fn test_empty_bundle() {
        assert!(DropBundle::default().is_empty());
    }

    #[test]
    fn test_wire_shape_camel_case() {
        let json = r#"{
            "gold": 10,
            "exp": 40,
            "items": [{"name": "Old Boot"}],
            "cards": [{
                "title": "Weekly Review",
                "bonus": {"experienceMultiplier": 1.5, "goldMultiplier": 2.0}
            }]
        }"#;

        let bundle: DropBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.cards[0].bonus.gold_multiplier, 2.0);
        assert_eq!(bundle.items[0].name, "Old Boot");
    }

    #[test]
    fn test_missing_fields_default() {
        let bundle: DropBundle = serde_json::from_str(r#"{"gold": 5}"#).unwrap();
        assert_eq!(bundle.gold, 5);
        assert_eq!(bundle.exp, 0);
        assert!(bundle.cards.is_empty());
    }
}
