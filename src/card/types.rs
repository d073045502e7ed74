use serde::{Deserialize, Serialize};
use std::fmt;

/// Card types in Dominion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Treasure,
    Action,
    Victory,
    Curse,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Treasure => write!(f, "treasure"),
            CardType::Action => write!(f, "action"),
            CardType::Victory => write!(f, "victory"),
            CardType::Curse => write!(f, "curse"),
        }
    }
}

/// A card definition. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub types: Vec<CardType>,
    /// Cards drawn when played
    #[serde(default)]
    pub draw: u32,
    /// +Actions granted when played
    #[serde(default)]
    pub actions: u32,
    /// +Buys granted when played
    #[serde(default)]
    pub buys: u32,
    /// +Coins granted when played as an action
    #[serde(default)]
    pub coins: u32,
    /// Coins produced when played as a treasure
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub vp: i32,
    /// The first Silver played this turn produces +1 coin per resolved card with this flag
    #[serde(default)]
    pub merchant: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Card {
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    pub fn is_action(&self) -> bool {
        self.has_type(CardType::Action)
    }

    pub fn is_treasure(&self) -> bool {
        self.has_type(CardType::Treasure)
    }

    pub fn type_line(&self) -> String {
        self.types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attributes_default_to_zero() {
        let json = r#"{ "id": "estate", "name": "Estate", "types": ["victory"], "vp": 1 }"#;
        let card: Card = serde_json::from_str(json).expect("Estate should parse");

        assert_eq!(card.draw, 0);
        assert_eq!(card.actions, 0);
        assert_eq!(card.value, 0);
        assert!(!card.merchant);
        assert!(card.aliases.is_empty());
        assert!(!card.is_action());
        assert!(!card.is_treasure());
    }

    #[test]
    fn test_type_line() {
        let json = r#"{ "id": "x", "name": "X", "types": ["action", "treasure"] }"#;
        let card: Card = serde_json::from_str(json).expect("card should parse");
        assert_eq!(card.type_line(), "action, treasure");
        assert!(card.is_action() && card.is_treasure());
    }
}
