//! Card Filtering
//!
//! Pure predicates over cards. A card is visible when it passes every
//! active dimension (AND); labels and members match any selected value (OR).
//! Filtering never reorders, only removes.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Card, MemberId};

/// Due-date bucket, compared by calendar day in the viewer's time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueBucket {
    /// Due strictly before today
    Overdue,
    Today,
    Tomorrow,
    /// No due date set
    None,
}

impl DueBucket {
    pub const ALL: [DueBucket; 4] = [DueBucket::Overdue, DueBucket::Today, DueBucket::Tomorrow, DueBucket::None];

    pub fn label(self) -> &'static str {
        match self {
            DueBucket::Overdue => "Overdue",
            DueBucket::Today => "Due Today",
            DueBucket::Tomorrow => "Due Tomorrow",
            DueBucket::None => "No Due Date",
        }
    }

    fn matches(self, due: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, due) {
            (DueBucket::None, due) => due.is_none(),
            (_, None) => false,
            (DueBucket::Overdue, Some(day)) => day < today,
            (DueBucket::Today, Some(day)) => day == today,
            (DueBucket::Tomorrow, Some(day)) => Some(day) == today.checked_add_days(Days::new(1)),
        }
    }
}

/// Active filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub labels: BTreeSet<String>,
    pub members: BTreeSet<MemberId>,
    pub due: Option<DueBucket>,
    pub search: String,
}

impl CardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// No dimension is active; the filter is the identity
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active dimensions
    pub fn active_count(&self) -> usize {
        [
            !self.labels.is_empty(),
            !self.members.is_empty(),
            self.due.is_some(),
            !self.search.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn toggle_label(&mut self, label: &str) {
        if !self.labels.remove(label) {
            self.labels.insert(label.to_string());
        }
    }

    pub fn toggle_member(&mut self, member: &MemberId) {
        if !self.members.remove(member) {
            self.members.insert(member.clone());
        }
    }

    /// Selecting the active bucket again clears it
    pub fn toggle_due(&mut self, bucket: DueBucket) {
        self.due = if self.due == Some(bucket) { None } else { Some(bucket) };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Does `card` pass every active dimension, as seen at `now`
    pub fn matches<Tz: TimeZone>(&self, card: &Card, now: &DateTime<Tz>) -> bool {
        if !self.labels.is_empty() && self.labels.is_disjoint(&card.labels) {
            return false;
        }
        if !self.members.is_empty() && self.members.is_disjoint(&card.assigned_to) {
            return false;
        }
        if let Some(bucket) = self.due {
            let today = now.date_naive();
            if !bucket.matches(local_day(card.due_date.as_ref(), now), today) {
                return false;
            }
        }

        let query = self.search.to_lowercase();
        query.is_empty()
            || card.title.to_lowercase().contains(&query)
            || card.description.to_lowercase().contains(&query)
    }

    /// Visible subset of `cards`, in their original order
    pub fn apply<'a, Tz: TimeZone>(&self, cards: &'a [Card], now: &DateTime<Tz>) -> Vec<&'a Card> {
        cards.iter().filter(|card| self.matches(card, now)).collect()
    }
}

/// Calendar day of `due` in the time zone of `now`
fn local_day<Tz: TimeZone>(due: Option<&DateTime<Utc>>, now: &DateTime<Tz>) -> Option<NaiveDate> {
    due.map(|due| due.with_timezone(&now.timezone()).date_naive())
}

/// Urgency of a due date, for card badges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue { days: i64 },
    Today,
    Tomorrow,
    /// Within a week
    Soon { days: i64 },
    Future { days: i64 },
}

impl DueStatus {
    pub fn classify<Tz: TimeZone>(due: &DateTime<Utc>, now: &DateTime<Tz>) -> Self {
        let due_day = due.with_timezone(&now.timezone()).date_naive();
        let days = due_day.signed_duration_since(now.date_naive()).num_days();
        match days {
            d if d < 0 => DueStatus::Overdue { days: -d },
            0 => DueStatus::Today,
            1 => DueStatus::Tomorrow,
            d if d <= 7 => DueStatus::Soon { days: d },
            d => DueStatus::Future { days: d },
        }
    }

    pub fn text(&self) -> String {
        match self {
            DueStatus::Overdue { days: 1 } => "Overdue by 1 day".to_string(),
            DueStatus::Overdue { days } => format!("Overdue by {} days", days),
            DueStatus::Today => "Due today".to_string(),
            DueStatus::Tomorrow => "Due tomorrow".to_string(),
            DueStatus::Soon { days } | DueStatus::Future { days } => format!("{} days left", days),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DueStatus::Overdue { .. } => "#eb5a46",
            DueStatus::Today => "#ff9f1a",
            DueStatus::Tomorrow => "#f2d600",
            DueStatus::Soon { .. } => "#61bd4f",
            DueStatus::Future { .. } => "#b3bac5",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StageId;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn card(id: &str, title: &str) -> Card {
        Card::new(id, title, StageId::new("todo"), 0)
    }

    fn sample() -> Vec<Card> {
        let mut a = card("a", "Fix login bug");
        a.labels.insert("Bug".into());
        a.assigned_to.insert(MemberId::new("ann"));
        a.due_date = Some(at(2024, 6, 9, 12));

        let mut b = card("b", "Ship release");
        b.description = "Tag and PUBLISH the crate".into();
        b.labels.insert("Feature".into());
        b.due_date = Some(at(2024, 6, 10, 8));

        let mut c = card("c", "Write docs");
        c.assigned_to.insert(MemberId::new("bob"));
        c.due_date = Some(at(2024, 6, 11, 20));

        let d = card("d", "Plan sprint");
        vec![a, b, c, d]
    }

    fn ids(cards: &[&Card]) -> Vec<String> {
        cards.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let filter = CardFilter::new();

        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_overdue_excludes_today() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let filter = CardFilter {
            due: Some(DueBucket::Overdue),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["a"]);
    }

    #[test]
    fn test_today_tomorrow_and_none_buckets() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let mut filter = CardFilter::new();

        filter.toggle_due(DueBucket::Today);
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["b"]);

        filter.toggle_due(DueBucket::Tomorrow);
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["c"]);

        filter.toggle_due(DueBucket::None);
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["d"]);

        filter.toggle_due(DueBucket::None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_due_day_uses_viewer_time_zone() {
        let cards = sample();
        // 2024-06-10 09:00 UTC is already the 11th at UTC+14; b (due 08:00 UTC) is overdue there
        let kiribati = FixedOffset::east_opt(14 * 3600).unwrap();
        let now = at(2024, 6, 10, 9).with_timezone(&kiribati);
        let filter = CardFilter {
            due: Some(DueBucket::Overdue),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["a", "b"]);
    }

    #[test]
    fn test_or_within_and_across_dimensions() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let mut filter = CardFilter::new();
        filter.toggle_label("Bug");
        filter.toggle_label("Feature");
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["a", "b"]);

        filter.toggle_member(&MemberId::new("ann"));
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["a"]);
        assert_eq!(filter.active_count(), 2);

        filter.toggle_label("Bug");
        assert!(filter.apply(&cards, &now).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_description() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let filter = CardFilter {
            search: "publish".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["b"]);

        let filter = CardFilter {
            search: "DOCS".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["c"]);

        // the query is matched literally, surrounding spaces included
        let filter = CardFilter {
            search: " docs ".into(),
            ..Default::default()
        };
        assert!(filter.apply(&cards, &now).is_empty());
        let filter = CardFilter {
            search: "e d".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&cards, &now)), vec!["c"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let cards = sample();
        let now = at(2024, 6, 10, 9);
        let mut filter = CardFilter::new();
        filter.toggle_label("Bug");
        filter.search = "fix".into();

        let once: Vec<Card> = filter.apply(&cards, &now).into_iter().cloned().collect();
        let twice: Vec<Card> = filter.apply(&once, &now).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut filter = CardFilter::new();
        filter.toggle_label("Bug");
        filter.toggle_due(DueBucket::Today);
        filter.search = "x".into();
        filter.clear();
        assert_eq!(filter, CardFilter::default());
    }

    #[test]
    fn test_due_status_classification() {
        let now = at(2024, 6, 10, 9);
        assert_eq!(DueStatus::classify(&at(2024, 6, 8, 0), &now), DueStatus::Overdue { days: 2 });
        assert_eq!(DueStatus::classify(&at(2024, 6, 10, 23), &now), DueStatus::Today);
        assert_eq!(DueStatus::classify(&at(2024, 6, 11, 0), &now), DueStatus::Tomorrow);
        assert_eq!(DueStatus::classify(&at(2024, 6, 17, 0), &now), DueStatus::Soon { days: 7 });
        assert_eq!(DueStatus::classify(&at(2024, 6, 30, 0), &now), DueStatus::Future { days: 20 });

        assert_eq!(DueStatus::Overdue { days: 1 }.text(), "Overdue by 1 day");
        assert_eq!(DueStatus::Soon { days: 3 }.text(), "3 days left");
    }
}
