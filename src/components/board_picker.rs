//! Board Picker Component
//!
//! Workspace tabs and the boards of the selected workspace.

use leptos::prelude::*;
use taskboard_core::domain::WorkspaceId;

use crate::store::{store_select_workspace, use_board_store, BoardStateStoreFields, BoardStore};

#[component]
pub fn BoardPicker() -> impl IntoView {
    let store = use_board_store();

    view! {
        <nav class="board-picker">
            <div class="workspace-tab-bar">
                <For
                    each=move || store.workspaces().get()
                    key=|ws| ws.id.clone()
                    children=move |ws| {
                        let id = ws.id.clone();
                        let active_id = ws.id.clone();
                        let is_active = move || store.current_workspace().with(|c| c.as_ref() == Some(&active_id));
                        view! {
                            <button
                                class=move || if is_active() { "workspace-tab active" } else { "workspace-tab" }
                                title=ws.description.clone().unwrap_or_default()
                                on:click=move |_| select_workspace(&store, id.clone())
                            >
                                {ws.name.clone()}
                            </button>
                        }
                    }
                />
            </div>

            <ul class="board-list">
                <For
                    each=move || store.boards().get()
                    key=|board| board.id.clone()
                    children=move |board| {
                        let id = board.id.clone();
                        let active_id = board.id.clone();
                        let is_active = move || store.current_board().with(|c| c.as_ref() == Some(&active_id));
                        view! {
                            <li
                                class=move || if is_active() { "board-link active" } else { "board-link" }
                                style=format!("border-left-color: {};", board.background_color)
                                on:click=move |_| store.current_board().set(Some(id.clone()))
                            >
                                {board.name.clone()}
                            </li>
                        }
                    }
                />
            </ul>
        </nav>
    }
}

fn select_workspace(store: &BoardStore, id: WorkspaceId) {
    if store.current_workspace().with_untracked(|c| c.as_ref() != Some(&id)) {
        store_select_workspace(store, id);
    }
}
