//! Runtime configuration with defaults; the CLI overrides individual fields.

use std::path::PathBuf;
use std::time::Duration;

pub const SCRYFALL_BASE_URL: &str = "https://api.scryfall.com";
pub const USER_AGENT: &str = "SetFinder/1.0";

/// Settings for the card resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Names per disjunctive search query
    pub batch_size: usize,
    /// Pause between consecutive Scryfall calls
    pub throttle: Duration,
    /// Consecutive 429 answers tolerated for one query before giving up on it
    pub max_rate_limit_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            throttle: Duration::from_millis(100),
            max_rate_limit_retries: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scryfall_base_url: String,
    pub user_agent: String,
    pub resolver: ResolverConfig,
    pub database_path: PathBuf,
    pub set_cache_path: PathBuf,
    pub session_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scryfall_base_url: SCRYFALL_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            resolver: ResolverConfig::default(),
            database_path: default_database_path(),
            set_cache_path: default_set_cache_path(),
            session_path: default_session_path(),
        }
    }
}

/// ~/.local/share/set_finder/collection.db
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("set_finder")
        .join("collection.db")
}

/// ~/.cache/set_finder/sets.json
pub fn default_set_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("set_finder")
        .join("sets.json")
}

/// ~/.config/set_finder/session.json
pub fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("set_finder")
        .join("session.json")
}
