//! Rarity and duplicate filters applied to set views before sorting.

use crate::grouping::by_set::SetCard;
use crate::models::{normalize_name, Rarity, ResolvedCard};
use crate::sorting::{sort_rows, SortState};
use std::collections::HashSet;

/// The set of rarities currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarityFilter {
    included: HashSet<Rarity>,
}

impl Default for RarityFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl RarityFilter {
    pub fn all() -> Self {
        Self::only(Rarity::ALL)
    }

    pub fn none() -> Self {
        Self {
            included: HashSet::new(),
        }
    }

    pub fn only<I: IntoIterator<Item = Rarity>>(rarities: I) -> Self {
        Self {
            included: rarities.into_iter().collect(),
        }
    }

    /// Parses a comma separated list such as `"rare,mythic"`
    pub fn parse_list(s: &str) -> Self {
        Self::only(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(Rarity::parse),
        )
    }

    pub fn contains(&self, rarity: Rarity) -> bool {
        self.included.contains(&rarity)
    }

    /// Flips one rarity on or off
    pub fn toggle(&mut self, rarity: Rarity) {
        if !self.included.remove(&rarity) {
            self.included.insert(rarity);
        }
    }

    pub fn includes_all(&self) -> bool {
        Rarity::ALL.iter().all(|r| self.included.contains(r))
    }

    /// Included rarities in rank order
    pub fn rarities(&self) -> Vec<Rarity> {
        let mut rarities: Vec<Rarity> = self.included.iter().copied().collect();
        rarities.sort();
        rarities
    }
}

/// Per-view display filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub rarities: RarityFilter,
    pub show_duplicates: bool,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            rarities: RarityFilter::all(),
            show_duplicates: true,
        }
    }
}

impl ViewFilter {
    /// Filters a set's rows, then sorts what is left. With duplicates
    /// hidden the first row of each name in the incoming order is kept.
    pub fn apply(&self, cards: &[SetCard], sort: &SortState) -> Vec<SetCard> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows: Vec<SetCard> = cards
            .iter()
            .filter(|sc| self.rarities.contains(sc.printing.rarity))
            .filter(|sc| self.show_duplicates || seen.insert(normalize_name(&sc.card.name)))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        rows
    }

    /// Flat card tables keep a card when any of its printings passes the
    /// rarity filter.
    pub fn apply_to_cards(&self, cards: &[ResolvedCard], sort: &SortState) -> Vec<ResolvedCard> {
        let mut rows: Vec<ResolvedCard> = cards
            .iter()
            .filter(|card| card.printings.iter().any(|p| self.rarities.contains(p.rarity)))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        rows
    }
}
