//! Session Bar Component
//!
//! Signed-in user and logout.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{store_reset, use_board_store};

#[component]
pub fn SessionBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_board_store();

    let user_name = move || {
        ctx.session
            .with(|s| s.user.as_ref().map(|u| u.display_name()))
            .unwrap_or_default()
    };

    let on_logout = move |_| {
        ctx.logout();
        store_reset(&store);
    };

    view! {
        <div class="session-bar">
            <span class="session-user">{user_name}</span>
            <button class="session-logout" on:click=on_logout>"Log out"</button>
        </div>
    }
}
