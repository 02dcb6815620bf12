//! Domain Layer - Core Entity Traits
//!
//! Every entity has a unique ID; orderable entities also carry a parent
//! reference and an ordinal `position` among their siblings.

use std::fmt::Debug;
use std::hash::Hash;

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + Ord + Hash + Debug;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Entities kept in a user-visible order under a parent
/// (lists within a board, cards within a list).
pub trait Orderable: Entity {
    /// The type of the owning parent's identifier
    type Parent: Clone + Eq + Hash + Debug;

    fn parent(&self) -> &Self::Parent;
    fn set_parent(&mut self, parent: Self::Parent);

    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
}

/// Declares a string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Workspace identifier
    WorkspaceId
);
string_id!(
    /// Board identifier
    BoardId
);
string_id!(
    /// Stage (board list) identifier
    StageId
);
string_id!(
    /// Card identifier
    CardId
);
string_id!(
    /// Comment identifier
    CommentId
);
string_id!(
    /// User / workspace member identifier
    MemberId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversion() {
        let id = CardId::from("c-1");
        assert_eq!(id.to_string(), "c-1");
        assert_eq!(id.as_str(), "c-1");
        assert_eq!(CardId::new(String::from("c-1")), id);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&StageId::new("s-9")).unwrap();
        assert_eq!(json, "\"s-9\"");
    }
}
