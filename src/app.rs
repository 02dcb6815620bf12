//! Taskboard Frontend App
//!
//! Restores the session, then loads workspaces, boards and the open board
//! as the selection changes.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use taskboard_core::{ClientConfig, Session};
use tracing::info;

use crate::board::{load_board, on_card_drop, on_stage_drop};
use crate::components::{BoardDnd, BoardPicker, BoardView, ErrorBanner, SessionBar};
use crate::context::AppContext;
use crate::store::{BoardState, BoardStateStoreFields};

use leptos_dragdrop::{bind_global_mouseup, create_dnd_signals};

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(ClientConfig::from_env());
    let store = Store::new(BoardState::default());
    let dnd = BoardDnd {
        stages: create_dnd_signals(),
        cards: create_dnd_signals(),
    };

    // Provide context to all children
    provide_context(ctx);
    provide_context(store);
    provide_context(dnd);

    bind_global_mouseup(dnd.stages, move |outcome| on_stage_drop(ctx, outcome));
    bind_global_mouseup(dnd.cards, move |outcome| on_card_drop(ctx, outcome));

    // Restore session on mount
    spawn_local(async move {
        let session = Session::hydrate(&ctx.token_store(), &ctx.api()).await;
        ctx.set_session(session);
        ctx.session_ready.set(true);
    });

    // Load workspaces once signed in
    Effect::new(move |_| {
        if !ctx.session.with(Session::is_authenticated) {
            return;
        }
        spawn_local(async move {
            match ctx.api().list_workspaces().await {
                Ok(loaded) => {
                    let first = loaded.first().map(|ws| ws.id.clone());
                    store.workspaces().set(loaded);
                    if store.current_workspace().get_untracked().is_none() {
                        store.current_workspace().set(first);
                    }
                }
                Err(err) => ctx.report_api(&err),
            }
        });
    });

    // Load boards when workspace changes
    Effect::new(move |_| {
        let Some(workspace) = store.current_workspace().get() else {
            return;
        };
        spawn_local(async move {
            match ctx.api().workspace_boards(&workspace).await {
                Ok(loaded) => store.boards().set(loaded),
                Err(err) => ctx.report_api(&err),
            }
        });
    });

    // Load the open board when selection or trigger changes
    Effect::new(move |_| {
        let trigger = ctx.reload_trigger.get();
        let Some(board_id) = store.current_board().get() else {
            return;
        };
        info!(board = %board_id, trigger, "loading board");
        store.loading().set(true);
        spawn_local(async move {
            if let Err(err) = load_board(ctx, store, board_id).await {
                ctx.report_api(&err);
            }
            store.loading().set(false);
        });
    });

    let signed_in = move || ctx.session.with(Session::is_authenticated);

    view! {
        <div class="app-layout">
            <ErrorBanner />

            {move || match (ctx.session_ready.get(), signed_in()) {
                (false, _) => view! { <p class="app-status">"Restoring session…"</p> }.into_any(),
                (true, false) => view! {
                    <p class="app-status">"You are signed out. Sign in to open your boards."</p>
                }.into_any(),
                (true, true) => view! {
                    <aside class="sidebar">
                        <h1>"Taskboard"</h1>
                        <SessionBar />
                        <BoardPicker />
                        <button class="reload-btn" on:click=move |_| ctx.reload()>"Reload"</button>
                    </aside>
                    <main class="main-content">
                        {move || match store.current_board().get() {
                            Some(board_id) => view! { <BoardView board_id=board_id /> }.into_any(),
                            None => view! { <p class="app-status">"Pick a board."</p> }.into_any(),
                        }}
                    </main>
                }.into_any(),
            }}
        </div>
    }
}
