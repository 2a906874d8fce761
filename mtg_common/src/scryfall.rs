//! Scryfall response objects.
//!
//! Only the fields the collection tools read are modelled; everything else in
//! the payload is ignored by serde.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback wait when a 429 carries no usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// One printing of a card as returned by `/cards/search?unique=prints`
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScryfallCard {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub set: String,
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub set_type: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub rarity: String,
    /// Missing for most multi-faced cards, the faces carry them instead
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    /// Games the printing exists in: "paper", "arena", "mtgo"
    #[serde(default)]
    pub games: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
}

impl ScryfallCard {
    /// Whether this printing was released on paper
    pub fn is_paper(&self) -> bool {
        self.games.iter().any(|g| g == "paper")
    }

    /// Face names of a multi-faced card, empty for single-faced cards
    pub fn face_names(&self) -> impl Iterator<Item = &str> {
        self.card_faces
            .iter()
            .flatten()
            .map(|face| face.name.as_str())
    }

    /// Color symbols of the card and all of its faces, unsorted, may repeat
    pub fn all_color_symbols(&self) -> impl Iterator<Item = &str> {
        let faces = self
            .card_faces
            .iter()
            .flatten()
            .flat_map(|face| face.colors.iter().flatten());
        self.colors
            .iter()
            .flatten()
            .chain(faces)
            .map(String::as_str)
    }

    /// Mana cost of the card, or the non-empty face costs joined with " // "
    pub fn combined_mana_cost(&self) -> String {
        match &self.mana_cost {
            Some(cost) => cost.clone(),
            None => self.join_faces(|face| face.mana_cost.as_deref()),
        }
    }

    /// Type line of the card, or the face type lines joined with " // "
    pub fn combined_type_line(&self) -> String {
        match &self.type_line {
            Some(line) => line.clone(),
            None => self.join_faces(|face| face.type_line.as_deref()),
        }
    }

    fn join_faces<F>(&self, field: F) -> String
    where
        F: Fn(&CardFace) -> Option<&str>,
    {
        self.card_faces
            .iter()
            .flatten()
            .filter_map(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" // ")
    }
}

/// Paginated list object (`"object": "list"`)
#[derive(Debug, Deserialize)]
pub struct ScryfallList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Set metadata from `/sets/{code}`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScryfallSet {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub set_type: String,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub parent_set_code: Option<String>,
}

impl ScryfallSet {
    /// Paper sets a user may put into a custom group.
    /// Digital-only, promo, token and memorabilia sets are excluded.
    pub fn is_collectible_paper(&self) -> bool {
        !self.digital
            && !self.set_type.contains("promo")
            && !self.set_type.contains("token")
            && !self.set_type.contains("memorabilia")
    }
}

/// Scryfall error object (`"object": "error"`)
#[derive(Debug, Deserialize)]
pub struct ScryfallErrorBody {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub details: String,
}

/// Longest wait a `Retry-After` header may impose
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

/// Parses a `Retry-After` header given in seconds, capped at `MAX_RETRY_AFTER`.
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    match value.map(str::trim).map(str::parse::<u64>) {
        Some(Ok(secs)) if Duration::from_secs(secs) > MAX_RETRY_AFTER => {
            log::warn!(
                "Retry-After of {}s exceeds the limit, waiting {:?}",
                secs,
                MAX_RETRY_AFTER
            );
            MAX_RETRY_AFTER
        }
        Some(Ok(secs)) => Duration::from_secs(secs),
        Some(Err(_)) => {
            log::warn!(
                "Unparseable Retry-After header, waiting {:?}",
                DEFAULT_RETRY_AFTER
            );
            DEFAULT_RETRY_AFTER
        }
        None => DEFAULT_RETRY_AFTER,
    }
}
