//! Plain-text tables and CSV export of result views.

use crate::error::AppResult;
use crate::filters::ViewFilter;
use crate::grouping::{ColorBucket, CustomGrouping, SetCard, SetGroup};
use crate::models::ResolvedCard;
use crate::sorting::{sort_rows, SortState};
use csv::WriterBuilder;

/// Renders rows under a header, columns padded to their widest cell.
/// The first column is right-aligned (quantities).
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let mut out = String::new();
        for (i, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if i > 0 {
                out.push_str(" | ");
            }
            if i == 0 {
                out.push_str(&format!("{:>width$}", cell, width = *width));
            } else {
                out.push_str(&format!("{:<width$}", cell, width = *width));
            }
        }
        out.trim_end().to_string()
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut output = String::new();
    output.push_str(&line(&header));
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');
    for row in rows {
        output.push_str(&line(row));
        output.push('\n');
    }
    output
}

fn set_codes(card: &ResolvedCard) -> String {
    card.printings
        .iter()
        .map(|p| p.set.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Search results: one row per resolved card
pub fn format_found_cards(cards: &[ResolvedCard]) -> String {
    if cards.is_empty() {
        return "No cards found.\n".to_string();
    }
    let rows: Vec<Vec<String>> = cards
        .iter()
        .map(|card| {
            vec![
                card.quantity.to_string(),
                card.name.clone(),
                set_codes(card),
                card.color_symbols(),
                card.mana_cost.clone(),
                card.type_line.clone(),
            ]
        })
        .collect();

    let mut output = render_table(&["Qty", "Name", "Sets", "Colors", "Mana Cost", "Type"], &rows);
    let total: i128 = cards.iter().map(|c| i128::from(c.quantity)).sum();
    output.push_str(&format!("Total: {} cards ({} unique)\n", total, cards.len()));
    output
}

pub fn format_unfound(names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let mut output = format!("Not found ({}):\n", names.len());
    for name in names {
        output.push_str(&format!("  - {}\n", name));
    }
    output
}

fn set_card_rows(rows: &[SetCard]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|sc| {
            vec![
                sc.card.quantity.to_string(),
                sc.printing.collector_number.clone(),
                sc.card.name.clone(),
                sc.printing.rarity.as_str().to_string(),
                sc.card.color_symbols(),
                sc.card.mana_cost.clone(),
                sc.card.type_line.clone(),
            ]
        })
        .collect()
}

const SET_HEADERS: [&str; 7] = ["Qty", "CN", "Name", "Rarity", "Colors", "Mana Cost", "Type"];

fn format_set_group(group: &SetGroup, filter: &ViewFilter, sort: &SortState) -> Option<String> {
    let rows = filter.apply(&group.cards, sort);
    if rows.is_empty() {
        return None;
    }
    let mut output = format!(
        "{} - {} ({} cards)\n",
        group.set_code.to_uppercase(),
        group.set_name,
        group.card_count(&filter.rarities)
    );
    output.push_str(&render_table(&SET_HEADERS, &set_card_rows(&rows)));
    Some(output)
}

fn format_set_groups(groups: &[SetGroup], filter: &ViewFilter, sort: &SortState) -> Vec<String> {
    groups
        .iter()
        .filter_map(|group| format_set_group(group, filter, sort))
        .collect()
}

/// By-set view; sets left empty by the filter are skipped
pub fn format_set_view(groups: &[SetGroup], filter: &ViewFilter, sort: &SortState) -> String {
    let sections = format_set_groups(groups, filter, sort);
    if sections.is_empty() {
        return "No sets match the current filters.\n".to_string();
    }
    sections.join("\n")
}

pub fn format_color_view(buckets: &[ColorBucket], sort: &SortState) -> String {
    let mut sections = Vec::new();
    for bucket in buckets {
        let mut cards = bucket.cards.clone();
        sort_rows(&mut cards, sort);
        let rows: Vec<Vec<String>> = cards
            .iter()
            .map(|card| {
                vec![
                    card.quantity.to_string(),
                    card.name.clone(),
                    card.mana_cost.clone(),
                    card.type_line.clone(),
                ]
            })
            .collect();
        let mut section = format!("{} ({} cards)\n", bucket.category.label(), cards.len());
        section.push_str(&render_table(&["Qty", "Name", "Mana Cost", "Type"], &rows));
        sections.push(section);
    }
    sections.join("\n")
}

/// Custom groups first, then the ungrouped sets
pub fn format_custom_view(grouping: &CustomGrouping, filter: &ViewFilter, sort: &SortState) -> String {
    let mut output = String::new();
    for grouped in &grouping.groups {
        output.push_str(&format!(
            "=== {} ({} cards) ===\n",
            grouped.group.name,
            grouped.card_count(&filter.rarities)
        ));
        output.push_str(&format_set_groups(&grouped.sets, filter, sort).join("\n"));
        output.push('\n');
    }
    let ungrouped = format_set_groups(&grouping.ungrouped, filter, sort);
    if !ungrouped.is_empty() {
        output.push_str("=== Ungrouped ===\n");
        output.push_str(&ungrouped.join("\n"));
    }
    output
}

/// One CSV row per visible (set, card) pair, sets in view order
pub fn export_set_view_csv(groups: &[SetGroup], filter: &ViewFilter, sort: &SortState) -> AppResult<String> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(vec![]);
    wtr.write_record([
        "set",
        "set_name",
        "collector_number",
        "name",
        "quantity",
        "rarity",
        "colors",
        "mana_cost",
        "type_line",
    ])?;

    for group in groups {
        for sc in filter.apply(&group.cards, sort) {
            wtr.write_record([
                group.set_code.to_uppercase().as_str(),
                group.set_name.as_str(),
                sc.printing.collector_number.as_str(),
                sc.card.name.as_str(),
                sc.card.quantity.to_string().as_str(),
                sc.printing.rarity.as_str(),
                sc.card.color_symbols().as_str(),
                sc.card.mana_cost.as_str(),
                sc.card.type_line.as_str(),
            ])?;
        }
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
