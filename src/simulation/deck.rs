use crate::card::{Card, CardDatabase};
use std::collections::HashMap;
use thiserror::Error;

/// Largest deck a list may expand to
pub const MAX_DECK_SIZE: usize = 10_000;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Deck list is empty")]
    Empty,
    #[error("Errors in deck list:\n{}", .0.join("\n"))]
    InvalidEntries(Vec<String>),
}

/// Parse a deck list such as "7 copper, 3 estate, 2 smithy".
///
/// Entries are separated by commas or newlines; `#` and `//` lines are comments.
/// Repeated cards are summed and the deck is expanded in first-seen order.
/// Every bad entry is reported, not just the first.
pub fn parse_deck_list(input: &str, database: &CardDatabase) -> Result<Vec<Card>, DeckError> {
    if input.trim().is_empty() {
        return Err(DeckError::Empty);
    }

    let mut errors = Vec::new();
    let mut order: Vec<&Card> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;

    let entries = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
        .flat_map(|line| line.split(','));

    for raw in entries {
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }

        let Some((count_str, name)) = entry.split_once(char::is_whitespace) else {
            errors.push(format!("Could not parse: \"{}\"", entry));
            continue;
        };
        // digits only: `parse` would also take a leading '+'
        if !count_str.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(format!("Could not parse: \"{}\"", entry));
            continue;
        }
        let Some(count) = count_str.parse::<usize>().ok().filter(|&n| n <= MAX_DECK_SIZE) else {
            errors.push(format!("Could not parse: \"{}\"", entry));
            continue;
        };

        let name = name.trim();
        let Some(card) = database.resolve(name) else {
            errors.push(format!("Unknown card: \"{}\"", name));
            continue;
        };

        if total + count > MAX_DECK_SIZE {
            errors.push(format!("Deck exceeds {} cards at: \"{}\"", MAX_DECK_SIZE, entry));
            continue;
        }
        total += count;

        let slot = counts.entry(card.id.as_str()).or_insert_with(|| {
            order.push(card);
            0
        });
        *slot += count;
    }

    if !errors.is_empty() {
        return Err(DeckError::InvalidEntries(errors));
    }

    let mut deck = Vec::with_capacity(total);
    for card in order {
        for _ in 0..counts[card.id.as_str()] {
            deck.push(card.clone());
        }
    }
    Ok(deck)
}

/// Parse a deck list stored in a file
pub fn parse_deck_file(path: &str, database: &CardDatabase) -> Result<Vec<Card>, DeckError> {
    let content = std::fs::read_to_string(path)?;
    parse_deck_list(&content, database)
}

/// Render a deck back to "N id, ..." in catalog order
pub fn format_deck_list(deck: &[Card], database: &CardDatabase) -> String {
    let mut counts: Vec<(usize, &str, usize)> = Vec::new();
    for card in deck {
        match counts.iter_mut().find(|(_, id, _)| *id == card.id) {
            Some((_, _, n)) => *n += 1,
            None => {
                let pos = database.position(&card.id).unwrap_or(usize::MAX);
                counts.push((pos, card.id.as_str(), 1));
            }
        }
    }
    // stable: cards missing from the catalog keep deck order at the end
    counts.sort_by_key(|(pos, _, _)| *pos);

    counts
        .iter()
        .map(|(_, id, n)| format!("{} {}", n, id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> CardDatabase {
        CardDatabase::builtin().expect("Failed to load cards")
    }

    #[test]
    fn test_parse_deck_list() {
        let db = db();
        let deck = parse_deck_list("7 copper, 3 estate, 3 lab, 1 village, 2 smithy", &db)
            .expect("Failed to parse deck");

        assert_eq!(deck.len(), 16);
        assert_eq!(deck.iter().filter(|c| c.id == "lab").count(), 3);
        assert_eq!(deck[0].id, "copper");
        assert_eq!(deck[15].id, "smithy");
    }

    #[test]
    fn test_aliases_and_repeats() {
        let db = db();
        let deck = parse_deck_list("3 c, 2 Council Room, 4 copper\n1 g", &db).expect("Failed to parse deck");

        assert_eq!(deck.len(), 10);
        assert_eq!(deck.iter().filter(|c| c.id == "copper").count(), 7);
        assert_eq!(deck.iter().filter(|c| c.id == "council_room").count(), 2);
        // first-seen order: copper block, then council room, then gold
        assert_eq!(deck[6].id, "copper");
        assert_eq!(deck[7].id, "council_room");
        assert_eq!(deck[9].id, "gold");
    }

    #[test]
    fn test_comments_and_blank_entries() {
        let db = db();
        let input = "# starting deck\n7 copper,\n\n// green\n3 estate";
        let deck = parse_deck_list(input, &db).expect("Failed to parse deck");
        assert_eq!(deck.len(), 10);
    }

    #[test]
    fn test_zero_count_is_allowed() {
        let db = db();
        let deck = parse_deck_list("0 gold, 2 copper", &db).expect("Failed to parse deck");
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let db = db();
        assert!(matches!(parse_deck_list("   ", &db), Err(DeckError::Empty)));
    }

    #[test]
    fn test_all_errors_collected() {
        let db = db();
        let result = parse_deck_list("7 copper, three estate, 2 chapel, smithy", &db);

        match result {
            Err(DeckError::InvalidEntries(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "Could not parse: \"three estate\"".to_string(),
                        "Unknown card: \"chapel\"".to_string(),
                        "Could not parse: \"smithy\"".to_string(),
                    ]
                );
            }
            other => panic!("expected InvalidEntries, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_counts_rejected() {
        let db = db();
        let result = parse_deck_list("18446744073709551615 copper, 1 copper, 1000000000000 estate", &db);
        match result {
            Err(DeckError::InvalidEntries(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "Could not parse: \"18446744073709551615 copper\"".to_string(),
                        "Could not parse: \"1000000000000 estate\"".to_string(),
                    ]
                );
            }
            other => panic!("expected InvalidEntries, got {:?}", other),
        }

        let result = parse_deck_list("6000 copper, 6000 copper", &db);
        match result {
            Err(DeckError::InvalidEntries(errors)) => {
                assert_eq!(errors, vec!["Deck exceeds 10000 cards at: \"6000 copper\"".to_string()]);
            }
            other => panic!("expected InvalidEntries, got {:?}", other),
        }

        let deck = parse_deck_list("9000 copper, 1000 estate", &db).expect("limit itself is allowed");
        assert_eq!(deck.len(), MAX_DECK_SIZE);
    }

    #[test]
    fn test_signed_count_rejected() {
        let db = db();
        let result = parse_deck_list("+3 copper, -1 estate", &db);
        match result {
            Err(DeckError::InvalidEntries(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "Could not parse: \"+3 copper\"".to_string(),
                        "Could not parse: \"-1 estate\"".to_string(),
                    ]
                );
            }
            other => panic!("expected InvalidEntries, got {:?}", other),
        }
    }

    #[test]
    fn test_format_deck_list() {
        let db = db();
        let deck = parse_deck_list("2 smithy, 7 copper, 1 village, 3 estate", &db).expect("Failed to parse deck");
        assert_eq!(format_deck_list(&deck, &db), "3 estate, 7 copper, 1 village, 2 smithy");
        assert_eq!(format_deck_list(&[], &db), "");
    }
}
