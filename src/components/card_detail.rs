//! Card Detail Component
//!
//! Side panel for the selected card: description, badges and comments.
//! Comments can be added; only their author may edit or delete them.

use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::domain::{CardId, Comment, CommentId};
use taskboard_core::DueStatus;

use crate::context::use_app_context;

#[component]
pub fn CardDetail(card_id: CardId, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = use_app_context();
    let comments = RwSignal::new(Vec::<Comment>::new());
    let draft = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<CommentId>);
    let edit_draft = RwSignal::new(String::new());

    let lookup_id = card_id.clone();
    let card = move || ctx.cards.0.with(|e| e.entities().find(|c| c.id == lookup_id).cloned());

    let load_id = card_id.clone();
    spawn_local(async move {
        match ctx.api().card_comments(&load_id).await {
            Ok(loaded) => comments.set(loaded),
            Err(err) => ctx.report_api(&err),
        }
    });

    let post_id = card_id.clone();
    let on_post = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get().trim().to_string();
        if content.is_empty() { return; }
        let card_id = post_id.clone();
        spawn_local(async move {
            match ctx.api().create_comment(&card_id, &content).await {
                Ok(comment) => {
                    comments.write().push(comment);
                    draft.set(String::new());
                }
                Err(err) => ctx.report_api(&err),
            }
        });
    };

    let on_delete = move |comment_id: CommentId| {
        spawn_local(async move {
            match ctx.api().delete_comment(&comment_id).await {
                Ok(()) => comments.write().retain(|c| c.id != comment_id),
                Err(err) => ctx.report_api(&err),
            }
        });
    };

    let on_save_edit = move |comment: Comment| {
        let content = edit_draft.get_untracked().trim().to_string();
        if content.is_empty() || content == comment.content {
            editing.set(None);
            return;
        }
        spawn_local(async move {
            match ctx.api().update_comment(&comment, &content).await {
                Ok(updated) => {
                    if let Some(slot) = comments.write().iter_mut().find(|c| c.id == updated.id) {
                        *slot = updated;
                    }
                    editing.set(None);
                }
                Err(err) => ctx.report_api(&err),
            }
        });
    };

    view! {
        <aside class="card-detail">
            <button class="card-detail-close" on:click=move |_| on_close.run(())>"×"</button>
            {move || card().map(|card| {
                let due = card.due_date.map(|due| DueStatus::classify(&due, &Local::now()));
                view! {
                    <h3>{card.title.clone()}</h3>
                    {due.map(|status| view! {
                        <div class="card-detail-due" style=format!("color: {};", status.color())>{status.text()}</div>
                    })}
                    <p class="card-detail-description">{card.description.clone()}</p>
                }
            })}

            <section class="card-comments">
                <h4>"Comments"</h4>
                <For
                    each=move || comments.get()
                    key=|comment| (comment.id.clone(), comment.content.clone())
                    children=move |comment| {
                        let can_modify = ctx.session.with_untracked(|s| s.can_modify(&comment));
                        let author = comment.author.display_name();
                        let comment_id = comment.id.clone();
                        let edit_id = comment.id.clone();
                        let is_editing = move || editing.with(|e| e.as_ref() == Some(&edit_id));
                        let original = comment.content.clone();
                        view! {
                            <div class="comment">
                                <span class="comment-author">{author}</span>
                                {move || if is_editing() {
                                    let target = comment.clone();
                                    view! {
                                        <textarea
                                            class="comment-edit"
                                            prop:value=move || edit_draft.get()
                                            on:input=move |ev| edit_draft.set(event_target_value(&ev))
                                        />
                                        <button class="comment-save" on:click=move |_| on_save_edit(target.clone())>"Save"</button>
                                        <button class="comment-cancel" on:click=move |_| editing.set(None)>"Cancel"</button>
                                    }.into_any()
                                } else {
                                    view! { <p class="comment-content">{comment.content.clone()}</p> }.into_any()
                                }}
                                {can_modify.then(|| {
                                    let start_id = comment_id.clone();
                                    let start_text = original.clone();
                                    view! {
                                        <button
                                            class="comment-edit-start"
                                            on:click=move |_| {
                                                edit_draft.set(start_text.clone());
                                                editing.set(Some(start_id.clone()));
                                            }
                                        >
                                            "Edit"
                                        </button>
                                        <button
                                            class="comment-delete"
                                            on:click=move |_| on_delete(comment_id.clone())
                                        >
                                            "Delete"
                                        </button>
                                    }
                                })}
                            </div>
                        }
                    }
                />
                <form class="comment-form" on:submit=on_post>
                    <textarea
                        placeholder="Write a comment"
                        prop:value=move || draft.get()
                        on:input=move |ev| draft.set(event_target_value(&ev))
                    />
                    <button type="submit">"Save"</button>
                </form>
            </section>
        </aside>
    }
}
