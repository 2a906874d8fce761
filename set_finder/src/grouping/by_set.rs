use crate::cache::SetCatalog;
use crate::filters::RarityFilter;
use crate::models::{normalize_name, Color, Rarity, ResolvedCard, SetPrinting};
use crate::sorting::{compare_collector_numbers, SortRow};
use std::collections::{HashMap, HashSet};

/// One printing of a card inside a set view
#[derive(Debug, Clone, PartialEq)]
pub struct SetCard {
    pub card: ResolvedCard,
    pub printing: SetPrinting,
}

impl SortRow for SetCard {
    fn name(&self) -> &str {
        &self.card.name
    }
    fn quantity(&self) -> i64 {
        self.card.quantity
    }
    fn collector_number(&self) -> &str {
        &self.printing.collector_number
    }
    fn rarity(&self) -> Rarity {
        self.printing.rarity
    }
    fn type_line(&self) -> &str {
        &self.card.type_line
    }
    fn colors(&self) -> &[Color] {
        &self.card.colors
    }
    fn mana_cost(&self) -> &str {
        &self.card.mana_cost
    }
}

/// All printings of the resolved cards that belong to one set
#[derive(Debug, Clone, PartialEq)]
pub struct SetGroup {
    pub set_code: String,
    pub set_name: String,
    /// Sorted by collector number
    pub cards: Vec<SetCard>,
}

impl SetGroup {
    /// Distinct card names with at least one printing whose rarity passes
    pub fn card_count(&self, filter: &RarityFilter) -> usize {
        self.cards
            .iter()
            .filter(|sc| filter.contains(sc.printing.rarity))
            .map(|sc| normalize_name(&sc.card.name))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Distinct card names regardless of rarity
    pub fn unique_card_count(&self) -> usize {
        self.card_count(&RarityFilter::all())
    }
}

/// Fans every card out over its printings and buckets them by set code.
/// Digital-only sets are dropped, the rest are ordered by descending number
/// of distinct cards (ties keep first-seen order).
pub fn group_by_set<C: SetCatalog + ?Sized>(cards: &[ResolvedCard], catalog: &mut C) -> Vec<SetGroup> {
    let mut groups: Vec<SetGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for card in cards {
        for printing in &card.printings {
            let key = printing.set.to_lowercase();
            let idx = *index.entry(key).or_insert_with(|| {
                groups.push(SetGroup {
                    set_code: printing.set.clone(),
                    set_name: printing.set_name.clone(),
                    cards: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].cards.push(SetCard {
                card: card.clone(),
                printing: printing.clone(),
            });
        }
    }

    let mut groups: Vec<SetGroup> = groups
        .into_iter()
        .filter(|group| {
            let digital = catalog.is_digital(&group.set_code);
            if digital {
                log::debug!("Skipping digital-only set {}", group.set_code);
            }
            !digital
        })
        .collect();

    for group in &mut groups {
        group.cards.sort_by(|a, b| {
            compare_collector_numbers(&a.printing.collector_number, &b.printing.collector_number)
        });
    }
    sort_by_card_count(&mut groups, &RarityFilter::all());

    log::info!("Grouped cards into {} sets", groups.len());
    groups
}

/// Stable sort, most distinct cards first
pub fn sort_by_card_count(groups: &mut [SetGroup], filter: &RarityFilter) {
    groups.sort_by_cached_key(|group| std::cmp::Reverse(group.card_count(filter)));
}
