//! Caching layer for Scryfall set metadata

pub mod set_cache;

pub use set_cache::{fetch_valid_set_codes, CachedSetCatalog, SetCache, SetCatalog};
