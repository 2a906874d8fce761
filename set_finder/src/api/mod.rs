//! API client for Scryfall

pub mod scryfall;

pub use scryfall::{exact_name_query, ScryfallClient, ScryfallResult};
