//! Domain Layer
//!
//! Board entities with normalized identifiers. No I/O happens here.

mod board;
mod card;
mod comment;
mod entity;

pub use board::{Board, Stage, Workspace, DEFAULT_BOARD_COLOR};
pub use card::{Card, Member};
pub use comment::Comment;
pub use entity::{BoardId, CardId, CommentId, Entity, MemberId, Orderable, StageId, WorkspaceId};
