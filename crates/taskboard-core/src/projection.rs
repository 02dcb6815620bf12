//! Board Projections
//!
//! Derived views over the loaded cards: per-stage grouping and the distinct
//! values offered by the filter bar.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Card, MemberId, Orderable, Stage, StageId};

/// Cards of each stage, ordered by position (ties by id)
pub fn group_by_stage<'a>(cards: impl IntoIterator<Item = &'a Card>) -> HashMap<StageId, Vec<&'a Card>> {
    let mut groups: HashMap<StageId, Vec<&Card>> = HashMap::new();
    for card in cards {
        groups.entry(card.parent().clone()).or_default().push(card);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    }
    groups
}

/// Stages in board order, each paired with its cards.
/// Stages without cards get an empty column; cards of unknown stages are left out.
pub fn board_columns<'a>(stages: &'a [Stage], cards: &'a [Card]) -> Vec<(&'a Stage, Vec<&'a Card>)> {
    let mut ordered: Vec<&Stage> = stages.iter().collect();
    ordered.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));

    let mut groups = group_by_stage(cards);
    ordered
        .into_iter()
        .map(|stage| (stage, groups.remove(&stage.id).unwrap_or_default()))
        .collect()
}

/// Distinct labels across `cards`, sorted
pub fn available_labels<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Vec<String> {
    cards
        .into_iter()
        .flat_map(|card| card.labels.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct assignees across `cards`, sorted
pub fn available_members<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Vec<MemberId> {
    cards
        .into_iter()
        .flat_map(|card| card.assigned_to.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardId;

    fn card(id: &str, stage: &str, position: i32) -> Card {
        Card::new(id, id.to_uppercase(), StageId::new(stage), position)
    }

    #[test]
    fn test_group_sorts_by_position_then_id() {
        let cards = vec![card("c", "todo", 1), card("b", "todo", 0), card("a", "todo", 1), card("x", "done", 0)];
        let groups = group_by_stage(&cards);

        let todo: Vec<&str> = groups[&StageId::new("todo")].iter().map(|c| c.id.as_str()).collect();
        assert_eq!(todo, vec!["b", "a", "c"]);
        assert_eq!(groups[&StageId::new("done")].len(), 1);
    }

    #[test]
    fn test_board_columns_keep_empty_stages() {
        let board = BoardId::new("b1");
        let stages = vec![
            Stage::new("done", "Done", board.clone(), 1),
            Stage::new("todo", "To Do", board, 0),
        ];
        let cards = vec![card("a", "todo", 0), card("ghost", "archived", 0)];

        let columns = board_columns(&stages, &cards);
        let names: Vec<&str> = columns.iter().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "Done"]);
        assert_eq!(columns[0].1.len(), 1);
        assert!(columns[1].1.is_empty());
    }

    #[test]
    fn test_available_values_are_distinct_and_sorted() {
        let mut a = card("a", "todo", 0);
        a.labels.extend(["Urgent".to_string(), "Bug".to_string()]);
        a.assigned_to.insert(MemberId::new("zoe"));
        let mut b = card("b", "todo", 1);
        b.labels.insert("Bug".to_string());
        b.assigned_to.insert(MemberId::new("ann"));

        let cards = vec![a, b];
        assert_eq!(available_labels(&cards), vec!["Bug", "Urgent"]);
        assert_eq!(available_members(&cards), vec![MemberId::new("ann"), MemberId::new("zoe")]);
    }
}
