//! Add Stage Form Component
//!
//! Inline input at the end of the board that appends a new stage.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::domain::BoardId;

use crate::board::add_stage;
use crate::context::use_app_context;

#[component]
pub fn AddStageForm(board_id: BoardId) -> impl IntoView {
    let ctx = use_app_context();
    let (adding, set_adding) = signal(false);
    let (new_name, set_new_name) = signal(String::new());

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get().trim().to_string();
        if name.is_empty() { return; }

        let board_id = board_id.clone();
        spawn_local(async move {
            if let Err(err) = add_stage(ctx, board_id, name).await {
                ctx.report_api(&err);
            }
        });

        set_new_name.set(String::new());
        set_adding.set(false);
    };

    move || if adding.get() {
        let on_add = on_add.clone();
        view! {
            <form class="stage-add-form" on:submit=on_add>
                <input
                    type="text"
                    placeholder="List name"
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                />
                <button type="submit">"Add list"</button>
                <button type="button" on:click=move |_| set_adding.set(false)>"×"</button>
            </form>
        }.into_any()
    } else {
        view! {
            <button class="stage-add-btn" on:click=move |_| set_adding.set(true)>
                "+ Add another list"
            </button>
        }.into_any()
    }
}
