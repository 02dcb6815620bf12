//! Card Tile Component
//!
//! Compact card as shown inside a stage column.

use chrono::Local;
use leptos::prelude::*;
use taskboard_core::domain::{Card, CardId};
use taskboard_core::DueStatus;

use crate::components::BoardDnd;

use leptos_dragdrop::*;

/// Label chip color; priority-style labels get fixed colors
fn label_color(label: &str) -> &'static str {
    match label.to_ascii_lowercase().as_str() {
        "high" | "urgent" | "bug" => "#eb5a46",
        "medium" => "#ff9f1a",
        "low" => "#61bd4f",
        _ => "#0079bf",
    }
}

#[component]
pub fn CardTile(
    card: Card,
    /// Index in the stage's full (unfiltered) sequence
    index: usize,
    selected_card: RwSignal<Option<CardId>>,
) -> impl IntoView {
    let dnd = use_context::<BoardDnd>().expect("BoardDnd should be provided");

    let id = card.id.clone();
    let stage_id = card.stage_id.clone();

    let on_mousedown = make_on_mousedown(dnd.cards, id.clone(), DropSlot::new(stage_id.clone(), index));
    let on_mousemove = make_on_item_mousemove(dnd.cards, stage_id.clone(), index, Axis::Vertical);

    let drag_id = id.clone();
    let selected_id = id.clone();
    let tile_class = move || {
        let mut c = String::from("card-tile");
        if dnd.cards.is_dragging(&drag_id) { c.push_str(" dragging"); }
        if dnd.cards.is_target(&stage_id, index) { c.push_str(" drop-before"); }
        if selected_card.with(|s| s.as_ref() == Some(&selected_id)) { c.push_str(" selected"); }
        c
    };

    let on_click = move |_| {
        // The click that ends a drag is not a selection
        if dnd.cards.drag_just_ended_read.get_untracked() {
            return;
        }
        selected_card.set(Some(id.clone()));
    };

    let due = card.due_date.map(|due| DueStatus::classify(&due, &Local::now()));
    let creator = card.created_by.as_ref().map(|m| m.display_name());
    let assignees = card.assigned_to.len();

    view! {
        <div
            class=tile_class
            on:mousedown=on_mousedown
            on:mousemove=on_mousemove
            on:click=on_click
        >
            {(!card.labels.is_empty()).then(|| view! {
                <div class="card-labels">
                    {card.labels.iter().map(|label| view! {
                        <span class="card-label" style=format!("background-color: {};", label_color(label))>
                            {label.clone()}
                        </span>
                    }).collect_view()}
                </div>
            })}

            <div class="card-title">{card.title.clone()}</div>

            <div class="card-meta">
                {due.map(|status| view! {
                    <span class="card-due" style=format!("color: {};", status.color())>{status.text()}</span>
                })}
                {(assignees > 0).then(|| view! { <span class="card-assignees">{format!("👤 {}", assignees)}</span> })}
                {creator.map(|name| view! { <span class="card-creator">{name}</span> })}
            </div>
        </div>
    }
}
