//! Board View Component
//!
//! Columns of the open board with drag-and-drop for stages and cards.
//! Uses leptos-dragdrop; stage columns are laid out horizontally, cards
//! vertically inside each column.

use leptos::prelude::*;
use taskboard_core::domain::{BoardId, CardId, StageId, DEFAULT_BOARD_COLOR};

use crate::components::{AddStageForm, CardDetail, FilterBar, StageColumn};
use crate::context::use_app_context;
use crate::store::{use_board_store, BoardStateStoreFields};

use leptos_dragdrop::*;

/// Drag state for both levels of the board, created once per app
#[derive(Clone, Copy)]
pub struct BoardDnd {
    pub stages: DndSignals<StageId, BoardId>,
    pub cards: DndSignals<CardId, StageId>,
}

#[component]
pub fn BoardView(board_id: BoardId) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_board_store();
    let dnd = use_context::<BoardDnd>().expect("BoardDnd should be provided");
    let selected_card = RwSignal::new(None::<CardId>);

    let stages_board = board_id.clone();
    let stages = move || ctx.stages.0.with(|e| e.sequence(&stages_board).to_vec());

    let background = move || {
        let color = store
            .board()
            .with(|b| b.as_ref().map(|b| b.background_color.clone()))
            .unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string());
        format!("background-color: {};", color)
    };
    let title = move || store.board().with(|b| b.as_ref().map(|b| b.name.clone()).unwrap_or_default());

    let pending_board = board_id.clone();
    let board_class = move || {
        let mut c = String::from("board");
        if ctx.stages.0.with(|e| e.is_pending(&pending_board)) { c.push_str(" saving"); }
        if dnd.stages.is_active() || dnd.cards.is_active() { c.push_str(" dragging"); }
        c
    };

    let tail_board = board_id.clone();
    let tail_len = move || ctx.stages.0.with_untracked(|e| e.sequence(&tail_board).len());
    let on_tail_enter = make_on_zone_mouseenter(dnd.stages, board_id.clone(), tail_len);
    let tail_target_board = board_id.clone();
    let tail_class = move || {
        let len = ctx.stages.0.with(|e| e.sequence(&tail_target_board).len());
        if dnd.stages.is_target(&tail_target_board, len) { "stage-tail drop-target" } else { "stage-tail" }
    };

    view! {
        <div class=board_class style=background>
            <header class="board-header">
                <h2>{title}</h2>
                {move || store.loading().get().then(|| view! { <span class="board-loading">"Loading…"</span> })}
            </header>

            <FilterBar />

            <div class="board-body">
                <div class="board-columns" on:mouseleave=make_on_mouseleave(dnd.stages)>
                    <For
                        each=move || stages().into_iter().enumerate()
                        key=|(index, stage)| (stage.id.clone(), *index, stage.name.clone())
                        children=move |(index, stage)| {
                            view! {
                                <StageColumn stage=stage index=index selected_card=selected_card />
                            }
                        }
                    />
                    <div class=tail_class on:mouseenter=on_tail_enter>
                        <AddStageForm board_id=board_id.clone() />
                    </div>
                </div>

                {move || selected_card.get().map(|card_id| view! {
                    <CardDetail card_id=card_id on_close=move |_| selected_card.set(None) />
                })}
            </div>
        </div>
    }
}
