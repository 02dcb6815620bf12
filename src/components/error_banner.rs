//! Error Banner Component
//!
//! Shows the latest failure notice and dismisses it after a delay.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::ErrorKind;

use crate::context::use_app_context;

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let ctx = use_app_context();
    let dismiss_ms = ctx.config.with_value(|c| c.error_dismiss_ms);

    // Each new notice gets its own timer; a timer only clears its own notice
    Effect::new(move |_| {
        let Some(id) = ctx.notice.with(|n| n.as_ref().map(|n| n.id)) else {
            return;
        };
        spawn_local(async move {
            TimeoutFuture::new(dismiss_ms).await;
            if ctx.notice.with_untracked(|n| n.as_ref().map(|n| n.id)) == Some(id) {
                ctx.notice.set(None);
            }
        });
    });

    move || {
        ctx.notice.get().map(|notice| {
            let class = match notice.kind {
                ErrorKind::NetworkFailure => "error-banner network",
                ErrorKind::ValidationFailure => "error-banner validation",
                ErrorKind::InvalidGesture => "error-banner gesture",
            };
            view! {
                <div class=class role="alert">
                    <span>{notice.message}</span>
                    <button class="error-dismiss" on:click=move |_| ctx.notice.set(None)>"×"</button>
                </div>
            }
        })
    }
}
