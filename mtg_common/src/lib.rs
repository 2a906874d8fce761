//! Shared types for MTG tooling: Scryfall wire formats and transport errors.

pub mod error;
pub mod scryfall;

pub use error::ScryfallError;
pub use scryfall::{
    parse_retry_after, CardFace, MAX_RETRY_AFTER, ScryfallCard, ScryfallErrorBody, ScryfallList, ScryfallSet,
};
