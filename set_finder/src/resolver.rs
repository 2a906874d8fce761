//! Resolves user-entered card names against Scryfall.
//!
//! Names are looked up in batches with one disjunctive exact-name query per
//! batch. Names a batch could not place are retried one by one. Lookups run
//! strictly sequentially with a fixed pause between calls, and a 429 answer
//! blocks the run for the server-provided delay before the same query is
//! sent again.

use crate::api::{exact_name_query, ScryfallClient, ScryfallResult};
use crate::config::ResolverConfig;
use crate::models::{normalize_name, CardEntry, Color, Rarity, ResolvedCard, SetPrinting};
use mtg_common::{ScryfallCard, ScryfallError};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Keep only the first printing per set code
    pub unique_sets_per_card: bool,
}

impl ResolveOptions {
    /// Every paper printing, several per set when a set has variants
    pub fn all_printings() -> Self {
        Self {
            unique_sets_per_card: false,
        }
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            unique_sets_per_card: true,
        }
    }
}

/// Outcome of a resolution run. Every requested name is either behind one
/// of `found` or listed in `unfound`, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveResult {
    pub found: Vec<ResolvedCard>,
    pub unfound: Vec<String>,
}

impl ResolveResult {
    /// Found cards with at least one printing in the given set
    pub fn cards_in_set(&self, set_code: &str) -> Vec<&ResolvedCard> {
        self.found
            .iter()
            .filter(|card| card.printed_in(set_code))
            .collect()
    }
}

pub struct CardResolver<'a> {
    client: &'a ScryfallClient,
    config: ResolverConfig,
}

impl<'a> CardResolver<'a> {
    pub fn new(client: &'a ScryfallClient, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    /// Resolves names; found cards carry quantity 1.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S], options: &ResolveOptions) -> ResolveResult {
        let (resolved, unfound) = self.run(names, options);
        ResolveResult {
            found: resolved.into_iter().map(|(_, card)| card).collect(),
            unfound,
        }
    }

    /// Resolves a parsed card list and attaches each entry's quantity to its
    /// card. When a name appears more than once the first entry wins.
    pub fn resolve_entries(&self, entries: &[CardEntry], options: &ResolveOptions) -> ResolveResult {
        let mut quantities: HashMap<String, i64> = HashMap::new();
        for entry in entries {
            quantities
                .entry(normalize_name(&entry.name))
                .or_insert(entry.quantity);
        }

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let (resolved, unfound) = self.run(&names, options);

        let found = resolved
            .into_iter()
            .map(|(input, mut card)| {
                card.quantity = quantities
                    .get(&normalize_name(&input))
                    .copied()
                    .unwrap_or(1);
                card
            })
            .collect();

        ResolveResult { found, unfound }
    }

    fn run<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &ResolveOptions,
    ) -> (Vec<(String, ResolvedCard)>, Vec<String>) {
        let requested = dedupe_names(names);
        log::info!("Resolving {} card names", requested.len());

        let mut run = ResolutionRun::new(self.client, &self.config, *options);
        for batch in requested.chunks(self.config.batch_size.max(1)) {
            run.resolve_batch(batch);
        }

        let leftovers: Vec<String> = requested
            .iter()
            .filter(|name| run.is_unfound(name))
            .cloned()
            .collect();
        if !leftovers.is_empty() {
            log::info!("Retrying {} names individually", leftovers.len());
        }
        for name in &leftovers {
            run.resolve_single(name);
        }

        run.finish(&requested)
    }
}

/// Accumulators of a single `resolve` call
struct ResolutionRun<'a> {
    client: &'a ScryfallClient,
    config: &'a ResolverConfig,
    options: ResolveOptions,
    /// Normalized input name -> resolved card
    found: HashMap<String, ResolvedCard>,
    /// Normalized input names not placed yet
    unfound: HashSet<String>,
    calls: usize,
}

impl<'a> ResolutionRun<'a> {
    fn new(client: &'a ScryfallClient, config: &'a ResolverConfig, options: ResolveOptions) -> Self {
        Self {
            client,
            config,
            options,
            found: HashMap::new(),
            unfound: HashSet::new(),
            calls: 0,
        }
    }

    fn is_unfound(&self, name: &str) -> bool {
        self.unfound.contains(&normalize_name(name))
    }

    fn resolve_batch(&mut self, batch: &[String]) {
        let query = exact_name_query(batch);
        let cards = match self.search_with_backoff(&query) {
            Ok(cards) => cards,
            Err(e) => {
                log::warn!("Batch lookup failed, names fall back to single lookups: {}", e);
                for name in batch {
                    self.mark_unfound(name);
                }
                return;
            }
        };

        let options = self.options;
        let index = PrintingIndex::build(&cards);
        for name in batch {
            match index.lookup(name) {
                Some(prints) => self.mark_found(name, build_card(prints, &options)),
                None => self.mark_unfound(name),
            }
        }
    }

    fn resolve_single(&mut self, name: &str) {
        let query = exact_name_query(&[name]);
        match self.search_with_backoff(&query) {
            Ok(cards) => {
                let options = self.options;
                let index = PrintingIndex::build(&cards);
                match index.lookup(name).or_else(|| index.first()) {
                    Some(prints) => self.mark_found(name, build_card(prints, &options)),
                    None => log::info!("Card not found: {}", name),
                }
            }
            Err(e) => log::warn!("Lookup for '{}' failed: {}", name, e),
        }
    }

    fn mark_found(&mut self, name: &str, card: ResolvedCard) {
        let key = normalize_name(name);
        self.unfound.remove(&key);
        self.found.entry(key).or_insert(card);
    }

    fn mark_unfound(&mut self, name: &str) {
        let key = normalize_name(name);
        if !self.found.contains_key(&key) {
            self.unfound.insert(key);
        }
    }

    /// One search, sleeping and retrying on 429 up to the configured limit
    fn search_with_backoff(&mut self, query: &str) -> ScryfallResult<Vec<ScryfallCard>> {
        let mut rate_limited = 0;
        loop {
            self.throttle();
            match self.client.search_prints(query) {
                Err(ScryfallError::RateLimited { retry_after })
                    if rate_limited < self.config.max_rate_limit_retries =>
                {
                    rate_limited += 1;
                    log::warn!(
                        "Rate limited ({} of {}), waiting {:?}",
                        rate_limited,
                        self.config.max_rate_limit_retries,
                        retry_after
                    );
                    std::thread::sleep(retry_after);
                }
                result => return result,
            }
        }
    }

    fn throttle(&mut self) {
        if self.calls > 0 && !self.config.throttle.is_zero() {
            std::thread::sleep(self.config.throttle);
        }
        self.calls += 1;
    }

    /// Pairs every found input name with its card, in input order. A card
    /// reached through two different inputs is reported once.
    fn finish(mut self, requested: &[String]) -> (Vec<(String, ResolvedCard)>, Vec<String>) {
        let mut resolved = Vec::new();
        let mut unfound = Vec::new();
        let mut seen_cards: HashSet<String> = HashSet::new();

        for name in requested {
            match self.found.remove(&normalize_name(name)) {
                Some(card) => {
                    if seen_cards.insert(normalize_name(&card.name)) {
                        resolved.push((name.clone(), card));
                    }
                }
                None => unfound.push(name.clone()),
            }
        }

        log::info!(
            "Resolved {} cards, {} not found",
            resolved.len(),
            unfound.len()
        );
        (resolved, unfound)
    }
}

/// Printings of one search response grouped by card, keyed case-insensitively.
/// The first card seen under a name owns it; later collisions are ignored.
struct PrintingIndex<'c> {
    groups: Vec<Vec<&'c ScryfallCard>>,
    by_name: HashMap<String, usize>,
}

impl<'c> PrintingIndex<'c> {
    fn build(cards: &'c [ScryfallCard]) -> Self {
        let mut groups: Vec<Vec<&ScryfallCard>> = Vec::new();
        let mut canonical: HashMap<String, usize> = HashMap::new();

        for card in cards {
            let key = normalize_name(&card.name);
            match canonical.get(&key) {
                Some(&idx) => groups[idx].push(card),
                None => {
                    canonical.insert(key, groups.len());
                    groups.push(vec![card]);
                }
            }
        }

        // Face names resolve too ("Delver of Secrets" for the full DFC name)
        let mut by_name = canonical.clone();
        for (idx, group) in groups.iter().enumerate() {
            for face in group[0].face_names() {
                by_name.entry(normalize_name(face)).or_insert(idx);
            }
        }

        Self { groups, by_name }
    }

    fn lookup(&self, name: &str) -> Option<&[&'c ScryfallCard]> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&idx| self.groups[idx].as_slice())
    }

    fn first(&self) -> Option<&[&'c ScryfallCard]> {
        self.groups.first().map(Vec::as_slice)
    }
}

/// Assembles a resolved card from all printings of one card
fn build_card(prints: &[&ScryfallCard], options: &ResolveOptions) -> ResolvedCard {
    let base = prints[0];

    let symbols: HashSet<&str> = base.all_color_symbols().collect();
    let colors: Vec<Color> = Color::ALL
        .into_iter()
        .filter(|c| symbols.contains(c.symbol()))
        .collect();

    let mut seen_sets: HashSet<String> = HashSet::new();
    let printings = prints
        .iter()
        .filter(|p| p.is_paper())
        .filter(|p| !options.unique_sets_per_card || seen_sets.insert(p.set.to_lowercase()))
        .map(|p| SetPrinting {
            set: p.set.clone(),
            set_name: p.set_name.clone(),
            rarity: Rarity::parse(&p.rarity),
            collector_number: p.collector_number.clone(),
            set_type: p.set_type.clone(),
        })
        .collect();

    ResolvedCard {
        name: base.name.clone(),
        quantity: 1,
        printings,
        colors,
        mana_cost: base.combined_mana_cost(),
        type_line: base.combined_type_line(),
    }
}

/// Trims names, drops blanks and case-insensitive repeats (first spelling kept)
fn dedupe_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(normalize_name(n)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
