use crate::card::types::Card;
use std::collections::HashMap;
use thiserror::Error;

/// Catalog compiled into the binary
const BUILTIN_CARDS: &str = include_str!("../../cards.json");

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}

/// Card catalog with lookup by id, display name or alias
pub struct CardDatabase {
    cards: Vec<Card>,
    // lowercase id / name / alias -> index into `cards`
    lookup: HashMap<String, usize>,
}

impl CardDatabase {
    /// The built-in base-set catalog
    pub fn builtin() -> Result<Self, CardDatabaseError> {
        Self::from_json_str(BUILTIN_CARDS)
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CardDatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CardDatabaseError> {
        let cards: Vec<Card> = serde_json::from_str(content)?;
        Self::from_cards(cards)
    }

    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CardDatabaseError> {
        if cards.is_empty() {
            return Err(CardDatabaseError::InvalidCard("No cards loaded".to_string()));
        }

        let mut lookup = HashMap::new();
        for (idx, card) in cards.iter().enumerate() {
            if card.id.trim().is_empty() {
                return Err(CardDatabaseError::InvalidCard(format!(
                    "card '{}' has an empty id",
                    card.name
                )));
            }
            if lookup.insert(normalize(&card.id), idx).is_some() {
                return Err(CardDatabaseError::InvalidCard(format!(
                    "duplicate card id '{}'",
                    card.id
                )));
            }
        }

        // Names and aliases never shadow an id
        for (idx, card) in cards.iter().enumerate() {
            for key in std::iter::once(&card.name).chain(card.aliases.iter()) {
                lookup.entry(normalize(key)).or_insert(idx);
            }
        }

        Ok(CardDatabase { cards, lookup })
    }

    /// Resolve a card by id, display name or alias (case-insensitive)
    pub fn resolve(&self, name_or_alias: &str) -> Option<&Card> {
        self.lookup
            .get(&normalize(name_or_alias))
            .map(|&idx| &self.cards[idx])
    }

    /// Get a card by id, display name or alias
    pub fn get_card(&self, name: &str) -> Result<Card, CardDatabaseError> {
        self.resolve(name)
            .cloned()
            .ok_or_else(|| CardDatabaseError::CardNotFound(name.to_string()))
    }

    /// All cards in catalog order
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Position of a card id in catalog order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
