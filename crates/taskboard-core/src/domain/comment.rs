//! Comment Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::Member;
use super::entity::{CardId, CommentId, Entity, MemberId};

/// A comment left on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub card_id: CardId,
    pub author: Member,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Only the author may edit or delete a comment
    pub fn is_editable_by(&self, user: &MemberId) -> bool {
        self.author.id == *user
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_author_can_edit() {
        let comment = Comment {
            id: CommentId::new("k1"),
            card_id: CardId::new("c1"),
            author: Member {
                id: MemberId::new("alice"),
                name: Some("Alice".into()),
                email: None,
            },
            content: "LGTM".into(),
            created_at: None,
        };

        assert!(comment.is_editable_by(&MemberId::new("alice")));
        assert!(!comment.is_editable_by(&MemberId::new("bob")));
    }
}
