use super::by_set::{sort_by_card_count, SetGroup};
use crate::filters::RarityFilter;
use crate::models::CustomGroup;
use crate::sorting::natural_compare;

/// One user group with the set views it claimed
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSets {
    pub group: CustomGroup,
    pub sets: Vec<SetGroup>,
}

impl GroupedSets {
    pub fn card_count(&self, filter: &RarityFilter) -> usize {
        self.sets.iter().map(|s| s.card_count(filter)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomGrouping {
    /// Non-empty groups in natural name order
    pub groups: Vec<GroupedSets>,
    /// Sets no group claimed
    pub ungrouped: Vec<SetGroup>,
}

/// Assigns each set view to the first custom group that lists its code.
/// Sets inside each group and the ungrouped list are ordered by descending
/// filtered card count.
pub fn group_by_custom(
    sets: Vec<SetGroup>,
    groups: &[CustomGroup],
    filter: &RarityFilter,
) -> CustomGrouping {
    let mut ordered: Vec<&CustomGroup> = groups.iter().collect();
    ordered.sort_by(|a, b| natural_compare(&a.name.to_lowercase(), &b.name.to_lowercase()));

    let mut claimed: Vec<Vec<SetGroup>> = vec![Vec::new(); ordered.len()];
    let mut ungrouped = Vec::new();

    for set in sets {
        match ordered.iter().position(|g| g.contains_set(&set.set_code)) {
            Some(idx) => claimed[idx].push(set),
            None => ungrouped.push(set),
        }
    }

    let groups = ordered
        .into_iter()
        .zip(claimed)
        .filter(|(_, sets)| !sets.is_empty())
        .map(|(group, mut sets)| {
            sort_by_card_count(&mut sets, filter);
            GroupedSets {
                group: group.clone(),
                sets,
            }
        })
        .collect();
    sort_by_card_count(&mut ungrouped, filter);

    CustomGrouping { groups, ungrouped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::by_set::SetCard;
    use crate::models::{Rarity, ResolvedCard, SetPrinting};

    fn set_group(code: &str, cards: &[(&str, Rarity)]) -> SetGroup {
        let cards = cards
            .iter()
            .enumerate()
            .map(|(i, (name, rarity))| {
                let printing = SetPrinting {
                    set: code.to_string(),
                    set_name: code.to_uppercase(),
                    rarity: *rarity,
                    collector_number: (i + 1).to_string(),
                    set_type: "expansion".to_string(),
                };
                SetCard {
                    card: ResolvedCard {
                        name: name.to_string(),
                        quantity: 1,
                        printings: vec![printing.clone()],
                        colors: Vec::new(),
                        mana_cost: String::new(),
                        type_line: "Artifact".to_string(),
                    },
                    printing,
                }
            })
            .collect();
        SetGroup {
            set_code: code.to_string(),
            set_name: code.to_uppercase(),
            cards,
        }
    }

    fn custom(id: &str, name: &str, sets: &[&str]) -> CustomGroup {
        CustomGroup {
            id: id.to_string(),
            name: name.to_string(),
            sets: sets.iter().map(|s| s.to_string()).collect(),
            user_id: "user".to_string(),
        }
    }

    fn codes(sets: &[SetGroup]) -> Vec<&str> {
        sets.iter().map(|s| s.set_code.as_str()).collect()
    }

    #[test]
    fn first_matching_group_wins_and_leftovers_are_ungrouped() {
        let sets = vec![
            set_group("dom", &[("A", Rarity::Common)]),
            set_group("dmu", &[("B", Rarity::Common)]),
            set_group("m19", &[("C", Rarity::Common)]),
        ];
        let groups = vec![
            custom("1", "Dominaria", &["DOM", "DMU"]),
            custom("2", "Everything D", &["DOM"]),
        ];

        let grouping = group_by_custom(sets, &groups, &RarityFilter::all());

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].group.name, "Dominaria");
        assert_eq!(codes(&grouping.groups[0].sets), vec!["dom", "dmu"]);
        assert_eq!(codes(&grouping.ungrouped), vec!["m19"]);
    }

    #[test]
    fn groups_follow_natural_name_order() {
        let sets = vec![
            set_group("a1", &[("A", Rarity::Common)]),
            set_group("a2", &[("B", Rarity::Common)]),
            set_group("a3", &[("C", Rarity::Common)]),
        ];
        let groups = vec![
            custom("1", "Group 10", &["a1"]),
            custom("2", "group 2", &["a2"]),
            custom("3", "Alpha", &["a3"]),
        ];

        let grouping = group_by_custom(sets, &groups, &RarityFilter::all());
        let names: Vec<_> = grouping.groups.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "group 2", "Group 10"]);
    }

    #[test]
    fn sets_ordered_by_filtered_count() {
        let sets = vec![
            set_group("aaa", &[("A", Rarity::Common), ("B", Rarity::Common)]),
            set_group("bbb", &[("C", Rarity::Mythic)]),
        ];
        let groups = vec![custom("1", "Both", &["aaa", "bbb"])];

        let all = group_by_custom(sets.clone(), &groups, &RarityFilter::all());
        assert_eq!(codes(&all.groups[0].sets), vec!["aaa", "bbb"]);

        let mythics = RarityFilter::only([Rarity::Mythic]);
        let filtered = group_by_custom(sets, &groups, &mythics);
        assert_eq!(codes(&filtered.groups[0].sets), vec!["bbb", "aaa"]);
        assert_eq!(filtered.groups[0].card_count(&mythics), 1);
    }

    #[test]
    fn no_custom_groups_leaves_everything_ungrouped() {
        let sets = vec![set_group("dom", &[("A", Rarity::Common)])];
        let grouping = group_by_custom(sets, &[], &RarityFilter::all());
        assert!(grouping.groups.is_empty());
        assert_eq!(codes(&grouping.ungrouped), vec!["dom"]);
    }
}
