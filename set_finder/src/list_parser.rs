//! Free-text card list parsing.
//!
//! Accepted quantity notations, tried in this order:
//! `2 Card`, `2x Card`, `Card x2`, `Card (2)`. Lines without a quantity
//! count as one copy.

use crate::models::CardEntry;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

lazy_static! {
    static ref LEADING_QUANTITY: Regex = Regex::new(r"^(\d+)(?:\s*x\s*|\s+)?(.+)$").unwrap();
    static ref TRAILING_X_QUANTITY: Regex = Regex::new(r"^(.+?)\s*x\s*(\d+)$").unwrap();
    static ref TRAILING_PAREN_QUANTITY: Regex =
        Regex::new(r"^(.+?)\s*\(\s*(\d+)\s*\)$").unwrap();
}

/// Where the quantity sits in a pattern's capture groups
enum QuantityAt {
    Start,
    End,
}

/// Parses one line. Returns `None` for blank lines.
pub fn parse_line(line: &str) -> Option<CardEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let patterns: [(&Regex, QuantityAt); 3] = [
        (&*LEADING_QUANTITY, QuantityAt::Start),
        (&*TRAILING_X_QUANTITY, QuantityAt::End),
        (&*TRAILING_PAREN_QUANTITY, QuantityAt::End),
    ];

    for (pattern, position) in patterns {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let (quantity, name) = match position {
            QuantityAt::Start => (&caps[1], &caps[2]),
            QuantityAt::End => (&caps[2], &caps[1]),
        };
        // Digits too long for i64 fall through to the next notation
        let Ok(quantity) = quantity.parse::<i64>() else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if quantity < 1 {
            log::warn!("Quantity {} for '{}' is not positive", quantity, name);
        }
        return Some(CardEntry::new(name, quantity));
    }

    Some(CardEntry::new(trimmed, 1))
}

/// Parses a block of text, one entry per non-empty line
pub fn parse_card_list(text: &str) -> Vec<CardEntry> {
    text.lines().filter_map(parse_line).collect()
}

/// Renders entries back into the editable `"<qty> <name>"` form
pub fn format_card_list(entries: &[CardEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{} {}", entry.quantity, entry.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads and parses a card list file
pub fn read_card_list<P: AsRef<Path>>(path: P) -> Result<Vec<CardEntry>, io::Error> {
    let content = fs::read_to_string(path)?;
    Ok(parse_card_list(&content))
}
