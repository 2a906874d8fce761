//! Column sorting for result tables.

use crate::grouping::by_color::ColorCategory;
use crate::models::{Color, Rarity, ResolvedCard};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Quantity,
    CollectorNumber,
    Rarity,
    TypeLine,
    Colors,
    ManaCost,
}

impl SortColumn {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "name" => Some(SortColumn::Name),
            "quantity" | "qty" => Some(SortColumn::Quantity),
            "collector_number" | "cn" | "number" => Some(SortColumn::CollectorNumber),
            "rarity" => Some(SortColumn::Rarity),
            "type_line" | "type" => Some(SortColumn::TypeLine),
            "colors" | "color" => Some(SortColumn::Colors),
            "mana_cost" | "cost" => Some(SortColumn::ManaCost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort column and direction of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::CollectorNumber,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Clicking the active column flips the direction, any other column
    /// becomes active in ascending order.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Anything that can be shown as a row of a card table
pub trait SortRow {
    fn name(&self) -> &str;
    fn quantity(&self) -> i64;
    fn collector_number(&self) -> &str;
    fn rarity(&self) -> Rarity;
    fn type_line(&self) -> &str;
    fn colors(&self) -> &[Color];
    fn mana_cost(&self) -> &str;
}

/// A card outside any set view uses its first printing for set columns
impl SortRow for ResolvedCard {
    fn name(&self) -> &str {
        &self.name
    }
    fn quantity(&self) -> i64 {
        self.quantity
    }
    fn collector_number(&self) -> &str {
        self.printings
            .first()
            .map(|p| p.collector_number.as_str())
            .unwrap_or("")
    }
    fn rarity(&self) -> Rarity {
        self.printings
            .first()
            .map(|p| p.rarity)
            .unwrap_or(Rarity::Special)
    }
    fn type_line(&self) -> &str {
        &self.type_line
    }
    fn colors(&self) -> &[Color] {
        &self.colors
    }
    fn mana_cost(&self) -> &str {
        &self.mana_cost
    }
}

/// Stable sort of rows by the active column
pub fn sort_rows<T: SortRow>(rows: &mut [T], state: &SortState) {
    rows.sort_by(|a, b| {
        let ordering = compare_by(state.column, a, b);
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn compare_by<T: SortRow>(column: SortColumn, a: &T, b: &T) -> Ordering {
    match column {
        SortColumn::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortColumn::Quantity => a.quantity().cmp(&b.quantity()),
        SortColumn::CollectorNumber => {
            compare_collector_numbers(a.collector_number(), b.collector_number())
        }
        SortColumn::Rarity => a.rarity().rank().cmp(&b.rarity().rank()),
        SortColumn::TypeLine => compare_type_lines(a.type_line(), b.type_line()),
        SortColumn::Colors => color_key(a.colors()).cmp(&color_key(b.colors())),
        SortColumn::ManaCost => a.mana_cost().cmp(b.mana_cost()),
    }
}

/// Leading digits compare by value ("9" < "10a"), numbered before unnumbered,
/// then the full string breaks ties ("10" < "10a").
pub fn compare_collector_numbers(a: &str, b: &str) -> Ordering {
    match (leading_digits(a), leading_digits(b)) {
        (Some(x), Some(y)) => compare_digit_runs(x, y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn leading_digits(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    (end > 0).then(|| &s[..end])
}

/// Display group of a color set first, then WUBRG sequence
fn color_key(colors: &[Color]) -> (u8, Vec<Color>) {
    let mut sorted = colors.to_vec();
    sorted.sort();
    (ColorCategory::from_colors(colors).order(), sorted)
}

/// Primary card type, declared in sort precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimaryType {
    Creature,
    Planeswalker,
    Battle,
    Enchantment,
    Instant,
    Sorcery,
    Kindred,
    Artifact,
    Land,
    Other,
}

impl PrimaryType {
    const BY_PRECEDENCE: [PrimaryType; 9] = [
        PrimaryType::Creature,
        PrimaryType::Planeswalker,
        PrimaryType::Battle,
        PrimaryType::Enchantment,
        PrimaryType::Instant,
        PrimaryType::Sorcery,
        PrimaryType::Kindred,
        PrimaryType::Artifact,
        PrimaryType::Land,
    ];

    pub fn word(&self) -> &'static str {
        match self {
            PrimaryType::Creature => "Creature",
            PrimaryType::Planeswalker => "Planeswalker",
            PrimaryType::Battle => "Battle",
            PrimaryType::Enchantment => "Enchantment",
            PrimaryType::Instant => "Instant",
            PrimaryType::Sorcery => "Sorcery",
            PrimaryType::Kindred => "Kindred",
            PrimaryType::Artifact => "Artifact",
            PrimaryType::Land => "Land",
            PrimaryType::Other => "Other",
        }
    }

    /// Classifies the part of a type line before the em-dash.
    /// Creature, Land and Artifact are checked before the general order so
    /// "Artifact Creature" is a creature and "Artifact Land" a land.
    pub fn of(type_line: &str) -> Self {
        let front = type_line.split('—').next().unwrap_or("").trim();
        for priority in [PrimaryType::Creature, PrimaryType::Land, PrimaryType::Artifact] {
            if front.contains(priority.word()) {
                return priority;
            }
        }
        Self::BY_PRECEDENCE
            .into_iter()
            .find(|t| front.contains(t.word()))
            .unwrap_or(PrimaryType::Other)
    }
}

pub fn compare_type_lines(a: &str, b: &str) -> Ordering {
    PrimaryType::of(a)
        .cmp(&PrimaryType::of(b))
        .then_with(|| a.cmp(b))
}

/// Numeric-aware string order: "Group 2" < "Group 10".
/// Digit runs sort before text runs at the same position.
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);
    for (x, y) in left.iter().zip(right.iter()) {
        let ordering = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => compare_digit_runs(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

enum Chunk<'s> {
    Digits(&'s str),
    Text(&'s str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(make_chunk(&s[start..], digit));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

/// Compares digit runs by value without overflowing
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, quantity: i64, type_line: &str, colors: &[Color]) -> ResolvedCard {
        ResolvedCard {
            name: name.to_string(),
            quantity,
            printings: Vec::new(),
            colors: colors.to_vec(),
            mana_cost: String::new(),
            type_line: type_line.to_string(),
        }
    }

    fn names(cards: &[ResolvedCard]) -> Vec<&str> {
        cards.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn collector_numbers_numeric_prefix_then_string() {
        assert_eq!(compare_collector_numbers("9", "10"), Ordering::Less);
        assert_eq!(compare_collector_numbers("10", "10a"), Ordering::Less);
        assert_eq!(compare_collector_numbers("9", "10a"), Ordering::Less);
        assert_eq!(compare_collector_numbers("10a", "10b"), Ordering::Less);
        assert_eq!(compare_collector_numbers("007", "7"), Ordering::Less);
        assert_eq!(compare_collector_numbers("300", "A12"), Ordering::Less);
        assert_eq!(compare_collector_numbers("5", "5"), Ordering::Equal);
    }

    #[test]
    fn mixed_collector_numbers_sort_without_cycles() {
        let mut numbers: Vec<String> = (1..=40).rev().map(|n| n.to_string()).collect();
        for n in (3..=39).step_by(3) {
            numbers.push(format!("{n}a"));
            numbers.push(format!("{n}★"));
        }
        numbers.push("S1".to_string());
        numbers.push("A7".to_string());

        numbers.sort_by(|a, b| compare_collector_numbers(a, b));

        assert_eq!(&numbers[..5], ["1", "2", "3", "3a", "3★"]);
        assert_eq!(&numbers[numbers.len() - 3..], ["40", "A7", "S1"]);
        for pair in numbers.windows(2) {
            assert_ne!(
                compare_collector_numbers(&pair[0], &pair[1]),
                Ordering::Greater,
                "{} before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn primary_type_precedence() {
        assert_eq!(PrimaryType::of("Artifact Creature — Golem"), PrimaryType::Creature);
        assert_eq!(PrimaryType::of("Artifact Land"), PrimaryType::Land);
        assert_eq!(PrimaryType::of("Legendary Enchantment Artifact"), PrimaryType::Artifact);
        assert_eq!(PrimaryType::of("Kindred Sorcery — Elf"), PrimaryType::Sorcery);
        assert_eq!(PrimaryType::of("Legendary Planeswalker — Jace"), PrimaryType::Planeswalker);
        assert_eq!(PrimaryType::of("Land — Island"), PrimaryType::Land);
        assert_eq!(PrimaryType::of("Instant"), PrimaryType::Instant);
        assert_eq!(PrimaryType::of("Conspiracy"), PrimaryType::Other);
        // Subtypes after the dash do not count
        assert_eq!(PrimaryType::of("Enchantment — Aura Creature"), PrimaryType::Enchantment);
    }

    #[test]
    fn type_line_sort_uses_precedence_then_text() {
        let mut cards = vec![
            card("Island", 1, "Basic Land — Island", &[]),
            card("Shock", 1, "Instant", &[Color::Red]),
            card("Bear", 1, "Creature — Bear", &[Color::Green]),
            card("Ornithopter", 1, "Artifact Creature — Thopter", &[]),
            card("Sol Ring", 1, "Artifact", &[]),
        ];
        sort_rows(&mut cards, &SortState::new(SortColumn::TypeLine, SortDirection::Ascending));
        assert_eq!(names(&cards), vec!["Ornithopter", "Bear", "Shock", "Sol Ring", "Island"]);
    }

    #[test]
    fn toggling_direction_reverses_order() {
        let mut cards = vec![
            card("b", 3, "", &[]),
            card("a", 1, "", &[]),
            card("c", 2, "", &[]),
        ];
        let mut state = SortState::new(SortColumn::Quantity, SortDirection::Ascending);
        sort_rows(&mut cards, &state);
        let ascending: Vec<String> = names(&cards).into_iter().map(String::from).collect();

        state.select(SortColumn::Quantity);
        assert_eq!(state.direction, SortDirection::Descending);
        sort_rows(&mut cards, &state);
        let mut descending: Vec<String> = names(&cards).into_iter().map(String::from).collect();
        descending.reverse();

        assert_eq!(ascending, descending);
    }

    #[test]
    fn selecting_new_column_resets_to_ascending() {
        let mut state = SortState::new(SortColumn::Name, SortDirection::Descending);
        state.select(SortColumn::Rarity);
        assert_eq!(state, SortState::new(SortColumn::Rarity, SortDirection::Ascending));
    }

    #[test]
    fn name_sort_ignores_case_and_colors_follow_display_order() {
        let mut cards = vec![
            card("beta", 1, "", &[Color::Green]),
            card("Alpha", 1, "", &[Color::White, Color::Blue]),
            card("gamma", 1, "", &[]),
            card("Delta", 1, "", &[Color::Blue]),
        ];
        sort_rows(&mut cards, &SortState::new(SortColumn::Name, SortDirection::Ascending));
        assert_eq!(names(&cards), vec!["Alpha", "beta", "Delta", "gamma"]);

        sort_rows(&mut cards, &SortState::new(SortColumn::Colors, SortDirection::Ascending));
        assert_eq!(names(&cards), vec!["Delta", "beta", "Alpha", "gamma"]);
    }

    #[test]
    fn natural_compare_orders_numbers_by_value() {
        let mut groups = vec!["Group 10", "group 2", "Group 1", "Alpha", "2 Beta"];
        groups.sort_by(|a, b| natural_compare(&a.to_lowercase(), &b.to_lowercase()));
        assert_eq!(groups, vec!["2 Beta", "Alpha", "Group 1", "group 2", "Group 10"]);
    }

    #[test]
    fn natural_compare_handles_huge_numbers_and_prefixes() {
        assert_eq!(
            natural_compare("set 99999999999999999999999", "set 100000000000000000000000"),
            Ordering::Less
        );
        assert_eq!(natural_compare("abc", "abc1"), Ordering::Less);
        assert_eq!(natural_compare("", "a"), Ordering::Less);
    }

    #[test]
    fn sort_column_parse_aliases() {
        assert_eq!(SortColumn::parse("collector-number"), Some(SortColumn::CollectorNumber));
        assert_eq!(SortColumn::parse("Type"), Some(SortColumn::TypeLine));
        assert_eq!(SortColumn::parse("price"), None);
    }
}
