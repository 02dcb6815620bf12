//! Filter Bar Component
//!
//! Label, member and due-date chips plus free-text search over the open
//! board's cards.

use std::collections::HashMap;

use leptos::prelude::*;
use taskboard_core::domain::MemberId;
use taskboard_core::projection::{available_labels, available_members};
use taskboard_core::DueBucket;

use crate::context::use_app_context;
use crate::store::{use_board_store, BoardStateStoreFields};

#[component]
pub fn FilterBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_board_store();
    let filter = store.filter();

    let labels = move || ctx.cards.0.with(|e| available_labels(e.entities()));
    let members = move || {
        ctx.cards.0.with(|e| {
            // Names are only known for members who created a card
            let names: HashMap<MemberId, String> = e
                .entities()
                .filter_map(|card| card.created_by.as_ref())
                .map(|m| (m.id.clone(), m.display_name()))
                .collect();
            available_members(e.entities())
                .into_iter()
                .map(|id| {
                    let name = names.get(&id).cloned().unwrap_or_else(|| id.to_string());
                    (id, name)
                })
                .collect::<Vec<_>>()
        })
    };

    let active_count = move || filter.with(|f| f.active_count());

    view! {
        <div class="filter-bar">
            <input
                type="search"
                class="filter-search"
                placeholder="Search cards"
                prop:value=move || filter.with(|f| f.search.clone())
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    filter.write().search = text;
                }
            />

            <div class="filter-group">
                <For
                    each=labels
                    key=|label| label.clone()
                    children=move |label| {
                        let chip = label.clone();
                        let text = label.clone();
                        let is_on = move || filter.with(|f| f.labels.contains(&chip));
                        view! {
                            <button
                                class=move || if is_on() { "filter-chip active" } else { "filter-chip" }
                                on:click=move |_| filter.write().toggle_label(&label)
                            >
                                {text}
                            </button>
                        }
                    }
                />
            </div>

            <div class="filter-group">
                <For
                    each=members
                    key=|(id, _)| id.clone()
                    children=move |(id, name)| {
                        let chip = id.clone();
                        let is_on = move || filter.with(|f| f.members.contains(&chip));
                        view! {
                            <button
                                class=move || if is_on() { "filter-chip member active" } else { "filter-chip member" }
                                on:click=move |_| filter.write().toggle_member(&id)
                            >
                                {name}
                            </button>
                        }
                    }
                />
            </div>

            <div class="filter-group">
                {DueBucket::ALL.into_iter().map(|bucket| {
                    let is_on = move || filter.with(|f| f.due == Some(bucket));
                    view! {
                        <button
                            class=move || if is_on() { "filter-chip due active" } else { "filter-chip due" }
                            on:click=move |_| filter.write().toggle_due(bucket)
                        >
                            {bucket.label()}
                        </button>
                    }
                }).collect_view()}
            </div>

            {move || (active_count() > 0).then(|| view! {
                <button class="filter-clear" on:click=move |_| filter.write().clear()>
                    {format!("Clear filters ({})", active_count())}
                </button>
            })}
        </div>
    }
}
