//! Stage Column Component
//!
//! One list of the board: a draggable header and the cards that pass the
//! active filter, in engine order.

use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::domain::{CardId, Stage};

use crate::board::refresh_stage;
use crate::components::{BoardDnd, CardTile};
use crate::context::use_app_context;
use crate::store::{use_board_store, BoardStateStoreFields};

use leptos_dragdrop::*;

#[component]
pub fn StageColumn(
    stage: Stage,
    /// Index of this stage in the board's sequence
    index: usize,
    selected_card: RwSignal<Option<CardId>>,
) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_board_store();
    let dnd = use_context::<BoardDnd>().expect("BoardDnd should be provided");

    let stage_id = stage.id.clone();
    let board_id = stage.board_id.clone();

    // Stage-level DnD: press on the header, hover anywhere on the column
    let on_header_mousedown = make_on_mousedown(dnd.stages, stage_id.clone(), DropSlot::new(board_id.clone(), index));
    let on_column_mousemove = make_on_item_mousemove(dnd.stages, board_id.clone(), index, Axis::Horizontal);

    let drag_id = stage_id.clone();
    let target_board = board_id.clone();
    let column_class = move || {
        let mut c = String::from("stage-column");
        if dnd.stages.is_dragging(&drag_id) { c.push_str(" dragging"); }
        if dnd.stages.is_target(&target_board, index) { c.push_str(" drop-before"); }
        c
    };

    // Cards passing the filter, paired with their index in the full sequence
    let visible_stage = stage_id.clone();
    let visible = move || {
        let filter = store.filter().get();
        let now = Local::now();
        ctx.cards.0.with(|e| {
            e.sequence(&visible_stage)
                .iter()
                .enumerate()
                .filter(|(_, card)| filter.matches(card, &now))
                .map(|(i, card)| (i, card.clone()))
                .collect::<Vec<_>>()
        })
    };

    let count_stage = stage_id.clone();
    let card_count = move || ctx.cards.0.with(|e| e.sequence(&count_stage).len());

    let pending_stage = stage_id.clone();
    let is_saving = move || ctx.cards.0.with(|e| e.is_pending(&pending_stage));

    let refresh_id = stage_id.clone();
    let on_refresh = move |_| {
        let stage_id = refresh_id.clone();
        spawn_local(async move {
            if let Err(err) = refresh_stage(ctx, stage_id).await {
                ctx.report_api(&err);
            }
        });
    };

    let tail_stage = stage_id.clone();
    let tail_len = move || ctx.cards.0.with_untracked(|e| e.sequence(&tail_stage).len());
    let on_tail_enter = make_on_zone_mouseenter(dnd.cards, stage_id.clone(), tail_len);
    let tail_target = stage_id.clone();
    let tail_count = card_count.clone();
    let tail_class = move || {
        if dnd.cards.is_target(&tail_target, tail_count()) { "card-tail drop-target" } else { "card-tail" }
    };

    view! {
        <section class=column_class on:mousemove=on_column_mousemove>
            <header class="stage-header" on:mousedown=on_header_mousedown>
                <h3>{stage.name.clone()}</h3>
                <span class="stage-count">{card_count}</span>
                {move || is_saving().then(|| view! { <span class="stage-saving" title="Saving order">"●"</span> })}
                <button
                    class="stage-refresh"
                    title="Refresh cards"
                    on:mousedown=|ev| ev.stop_propagation()
                    on:click=on_refresh
                >
                    "↻"
                </button>
            </header>

            <div class="card-list" on:mouseleave=make_on_mouseleave(dnd.cards)>
                <For
                    each=visible
                    key=|(index, card)| (card.id.clone(), *index, card.position, card.title.clone())
                    children=move |(index, card)| {
                        view! {
                            <CardTile card=card index=index selected_card=selected_card />
                        }
                    }
                />
                <div class=tail_class on:mouseenter=on_tail_enter />
            </div>
        </section>
    }
}
