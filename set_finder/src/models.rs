use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalizes a card name for case-insensitive joins between user input and
/// Scryfall results. Every name index in the crate is keyed by this.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The five colors of Magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    /// All colors in WUBRG order
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Scryfall color symbol (e.g. "W", "U")
    pub fn symbol(&self) -> &'static str {
        match self {
            Color::White => "W",
            Color::Blue => "U",
            Color::Black => "B",
            Color::Red => "R",
            Color::Green => "G",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "W" => Some(Color::White),
            "U" => Some(Color::Blue),
            "B" => Some(Color::Black),
            "R" => Some(Color::Red),
            "G" => Some(Color::Green),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Blue => "Blue",
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Green => "Green",
        }
    }

    /// Symbol used in text output
    pub fn emoji(&self) -> &'static str {
        match self {
            Color::White => "⚪",
            Color::Blue => "🔵",
            Color::Black => "⚫",
            Color::Red => "🔴",
            Color::Green => "🟢",
        }
    }
}

/// Printing rarity, declared in sort rank order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Timeshifted,
    /// Any other Scryfall rarity ("special", "bonus")
    #[serde(other)]
    Special,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Mythic,
        Rarity::Timeshifted,
        Rarity::Special,
    ];

    /// Parse a Scryfall rarity string. Unknown values map to `Special`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "common" => Rarity::Common,
            "uncommon" => Rarity::Uncommon,
            "rare" => Rarity::Rare,
            "mythic" => Rarity::Mythic,
            "timeshifted" => Rarity::Timeshifted,
            _ => Rarity::Special,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
            Rarity::Timeshifted => "timeshifted",
            Rarity::Special => "special",
        }
    }

    /// Position in the rarity sort order
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Mythic => 3,
            Rarity::Timeshifted => 4,
            Rarity::Special => 5,
        }
    }
}

/// One line of a user's card list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    pub name: String,
    pub quantity: i64,
}

impl CardEntry {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// The parser passes zero through unchanged; callers that need a
    /// positive quantity check it here.
    pub fn has_valid_quantity(&self) -> bool {
        self.quantity >= 1
    }
}

/// One physical printing of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPrinting {
    pub set: String,
    pub set_name: String,
    pub rarity: Rarity,
    pub collector_number: String,
    pub set_type: String,
}

/// A card name resolved against Scryfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCard {
    /// Canonical name, may differ in casing from the user's input
    pub name: String,
    pub quantity: i64,
    pub printings: Vec<SetPrinting>,
    /// Union of all face colors, WUBRG order
    pub colors: Vec<Color>,
    pub mana_cost: String,
    pub type_line: String,
}

impl ResolvedCard {
    /// Concatenated color symbols, e.g. "UR"
    pub fn color_symbols(&self) -> String {
        self.colors.iter().map(Color::symbol).collect()
    }

    /// Whether any printing belongs to the given set (case-insensitive)
    pub fn printed_in(&self, set_code: &str) -> bool {
        self.printings
            .iter()
            .any(|p| p.set.eq_ignore_ascii_case(set_code.trim()))
    }
}

/// A named card list saved by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardList {
    pub id: String,
    pub name: String,
    pub cards: Vec<CardEntry>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-defined bucket of set codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomGroup {
    pub id: String,
    pub name: String,
    pub sets: Vec<String>,
    pub user_id: String,
}

impl CustomGroup {
    pub fn contains_set(&self, set_code: &str) -> bool {
        self.sets.iter().any(|s| s.eq_ignore_ascii_case(set_code))
    }
}
