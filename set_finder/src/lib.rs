pub mod api;
pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod filters;
pub mod formatters;
pub mod grouping;
pub mod list_parser;
pub mod models;
pub mod resolver;
pub mod session;
pub mod sorting;
pub mod storage;

// Re-export commonly used items
pub use api::ScryfallClient;
pub use cache::{fetch_valid_set_codes, CachedSetCatalog, SetCache, SetCatalog};
pub use collection::Collection;
pub use config::{Config, ResolverConfig};
pub use error::{AppError, AppResult};
pub use filters::{RarityFilter, ViewFilter};
pub use grouping::{group_by_color, group_by_custom, group_by_set, ColorCategory, SetGroup};
pub use list_parser::{format_card_list, parse_card_list, parse_line};
pub use models::{CardEntry, CardList, Color, CustomGroup, Rarity, ResolvedCard, SetPrinting};
pub use resolver::{CardResolver, ResolveOptions, ResolveResult};
pub use session::{Session, SessionService, SessionSubscription};
pub use sorting::{SortColumn, SortDirection, SortState};
pub use storage::{ListStore, SqliteStore};
