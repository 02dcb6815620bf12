//! Workspace, Board and Stage Entities
//!
//! Boards belong to a workspace; stages (the board's lists/columns) belong
//! to a board and are ordered by `position`.

use serde::{Deserialize, Serialize};

use super::entity::{BoardId, Entity, Orderable, StageId, WorkspaceId};

/// Background used when the backend does not send one
pub const DEFAULT_BOARD_COLOR: &str = "#0079BF";

/// A workspace groups boards and members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Workspace {
    type Id = WorkspaceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A board inside a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub background_color: String,
    pub workspace_id: Option<WorkspaceId>,
}

impl Entity for Board {
    type Id = BoardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A named, ordered column of cards within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub board_id: BoardId,
    pub position: i32,
}

impl Stage {
    pub fn new(id: impl Into<StageId>, name: impl Into<String>, board_id: BoardId, position: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_id,
            position,
        }
    }
}

impl Entity for Stage {
    type Id = StageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Orderable for Stage {
    type Parent = BoardId;

    fn parent(&self) -> &Self::Parent {
        &self.board_id
    }

    fn set_parent(&mut self, parent: Self::Parent) {
        self.board_id = parent;
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}
