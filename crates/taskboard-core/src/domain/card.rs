//! Card Entity
//!
//! Cards live in exactly one stage and are ordered within it by `position`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{CardId, Entity, MemberId, Orderable, StageId};

/// A user as seen by the board (card creator, assignee, comment author)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Member {
    /// Name shown in the UI: name, else the email's local part, else "Unknown"
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// A card on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    pub labels: BTreeSet<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: BTreeSet<MemberId>,
    pub stage_id: StageId,
    pub position: i32,
    pub created_by: Option<Member>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>, stage_id: StageId, position: i32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            labels: BTreeSet::new(),
            due_date: None,
            assigned_to: BTreeSet::new(),
            stage_id,
            position,
            created_by: None,
            created_at: None,
        }
    }
}

impl Entity for Card {
    type Id = CardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Orderable for Card {
    type Parent = StageId;

    fn parent(&self) -> &Self::Parent {
        &self.stage_id
    }

    fn set_parent(&mut self, parent: Self::Parent) {
        self.stage_id = parent;
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: Option<&str>, email: Option<&str>) -> Member {
        Member {
            id: MemberId::new("m1"),
            name: name.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(member(Some("Ada"), Some("ada@x.io")).display_name(), "Ada");
        assert_eq!(member(None, Some("grace@x.io")).display_name(), "grace");
        assert_eq!(member(Some(""), None).display_name(), "Unknown");
    }

    #[test]
    fn test_card_orderable() {
        let mut card = Card::new("c1", "Write docs", StageId::new("todo"), 3);
        assert_eq!(card.position(), 3);
        card.set_parent(StageId::new("done"));
        card.set_position(0);
        assert_eq!(card.parent().as_str(), "done");
        assert_eq!(card.position, 0);
    }
}
