use crate::api::{ScryfallClient, ScryfallResult};
use crate::error::AppResult;
use mtg_common::ScryfallSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Answers whether a set is digital-only. Sets that cannot be looked up are
/// treated as paper so they stay visible.
pub trait SetCatalog {
    fn is_digital(&mut self, set_code: &str) -> bool;
}

/// Fixed list of digital set codes, for offline use and tests
impl SetCatalog for HashSet<String> {
    fn is_digital(&mut self, set_code: &str) -> bool {
        self.contains(&set_code.to_lowercase())
    }
}

/// Set metadata keyed by lowercase set code.
/// Optionally persisted as JSON so later runs skip the per-set lookups.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SetCache {
    sets: HashMap<String, ScryfallSet>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SetCache {
    /// Cache that lives only as long as this value
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load cache from disk, or start empty if missing or unreadable
    pub fn load(path: &Path) -> Self {
        let mut cache = if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<SetCache>(&content) {
                    Ok(cache) => {
                        log::info!("Loaded set cache with {} entries", cache.len());
                        cache
                    }
                    Err(e) => {
                        log::warn!("Failed to parse set cache, starting fresh: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read set cache, starting fresh: {}", e);
                    Self::default()
                }
            }
        } else {
            log::info!("Starting with empty set cache");
            Self::default()
        };
        cache.path = Some(path.to_path_buf());
        cache
    }

    /// Save cache to disk. No-op for in-memory caches.
    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        log::debug!("Saved set cache with {} entries", self.sets.len());
        Ok(())
    }

    pub fn get(&self, set_code: &str) -> Option<&ScryfallSet> {
        self.sets.get(&set_code.to_lowercase())
    }

    pub fn insert(&mut self, set: ScryfallSet) {
        self.sets.insert(set.code.to_lowercase(), set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// `SetCatalog` backed by the cache, falling back to `/sets/{code}`
pub struct CachedSetCatalog<'a> {
    client: &'a ScryfallClient,
    cache: &'a mut SetCache,
    throttle: Duration,
    calls: usize,
}

impl<'a> CachedSetCatalog<'a> {
    pub fn new(client: &'a ScryfallClient, cache: &'a mut SetCache, throttle: Duration) -> Self {
        Self {
            client,
            cache,
            throttle,
            calls: 0,
        }
    }
}

impl SetCatalog for CachedSetCatalog<'_> {
    fn is_digital(&mut self, set_code: &str) -> bool {
        if let Some(set) = self.cache.get(set_code) {
            log::debug!("Set cache hit for {}", set_code);
            return set.digital;
        }

        if self.calls > 0 && !self.throttle.is_zero() {
            std::thread::sleep(self.throttle);
        }
        self.calls += 1;

        match self.client.fetch_set(set_code) {
            Ok(set) => {
                let digital = set.digital;
                self.cache.insert(set);
                digital
            }
            Err(e) => {
                log::warn!("Set lookup for {} failed, keeping it: {}", set_code, e);
                false
            }
        }
    }
}

/// Upper-case codes of every paper set a custom group may contain
pub fn fetch_valid_set_codes(client: &ScryfallClient) -> ScryfallResult<HashSet<String>> {
    let codes: HashSet<String> = client
        .fetch_sets()?
        .into_iter()
        .filter(ScryfallSet::is_collectible_paper)
        .map(|set| set.code.to_uppercase())
        .collect();
    log::info!("Loaded {} valid set codes", codes.len());
    Ok(codes)
}
