//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. Stage and card
//! order is not kept here: it belongs to the reorder engines in
//! [`crate::context::AppContext`].

use leptos::prelude::*;
use reactive_stores::Store;
use taskboard_core::domain::{Board, BoardId, Workspace, WorkspaceId};
use taskboard_core::CardFilter;

/// Navigation and filter state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct BoardState {
    /// Workspaces of the signed-in user
    pub workspaces: Vec<Workspace>,
    pub current_workspace: Option<WorkspaceId>,
    /// Boards of the current workspace
    pub boards: Vec<Board>,
    pub current_board: Option<BoardId>,
    /// Metadata of the open board (name, background)
    pub board: Option<Board>,
    pub filter: CardFilter,
    /// Board load in progress
    pub loading: bool,
}

/// Type alias for the store
pub type BoardStore = Store<BoardState>;

/// Get the board store from context
pub fn use_board_store() -> BoardStore {
    expect_context::<BoardStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Switch workspace; the open board belongs to the old one
pub fn store_select_workspace(store: &BoardStore, workspace: WorkspaceId) {
    store.current_workspace().set(Some(workspace));
    store.boards().write().clear();
    store_close_board(store);
}

pub fn store_close_board(store: &BoardStore) {
    store.current_board().set(None);
    store.board().set(None);
    store.filter().write().clear();
}

/// Forget everything tied to the signed-in user
pub fn store_reset(store: &BoardStore) {
    *store.write() = BoardState::default();
}
