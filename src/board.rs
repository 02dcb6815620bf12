//! Board Loading & Drop Handling
//!
//! Glue between the views and the reorder engines: fills the engines from
//! the backend and turns finished drags into optimistic moves + commits.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::DragOutcome;
use taskboard_core::domain::{BoardId, Card, CardId, Stage, StageId};
use taskboard_core::projection::board_columns;
use taskboard_core::reorder::{drop_and_commit, resolve_slot, EngineCell};
use taskboard_core::{ApiResult, CardSink, DragResult, DropLocation, ReorderError, StageSink};
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::store::{BoardStateStoreFields, BoardStore};

/// Fetch the board, its stages and its cards, then replace engine state.
/// Stages without cards still get an (empty) card sequence.
pub async fn load_board(ctx: AppContext, store: BoardStore, board_id: BoardId) -> ApiResult<()> {
    let api = ctx.api();
    let board = api.get_board(&board_id).await?;
    let stages = api.list_stages(&board_id).await?;
    let cards = api.list_cards(&board_id).await?;

    // The user may have opened another board meanwhile
    if store.current_board().get_untracked().as_ref() != Some(&board_id) {
        debug!(board = %board_id, "discarding stale board load");
        return Ok(());
    }
    info!(board = %board_id, stages = stages.len(), cards = cards.len(), "board loaded");

    let per_stage: Vec<(StageId, Vec<Card>)> = board_columns(&stages, &cards)
        .into_iter()
        .map(|(stage, cards)| (stage.id.clone(), cards.into_iter().cloned().collect()))
        .collect();

    ctx.stages.with_engine(|engine| {
        engine.clear();
        engine.replace_parent(board_id.clone(), stages);
    });
    ctx.cards.with_engine(|engine| {
        engine.clear();
        for (stage, cards) in per_stage {
            engine.replace_parent(stage, cards);
        }
    });
    store.board().set(Some(board));
    Ok(())
}

/// Create a stage at the end of the board
pub async fn add_stage(ctx: AppContext, board_id: BoardId, name: String) -> ApiResult<()> {
    let position = ctx.stages.with_engine(|engine| engine.next_position(&board_id));
    let stage = ctx.api().create_stage(&board_id, &name, position).await?;
    ctx.cards.with_engine(|engine| engine.replace_parent(stage.id.clone(), Vec::new()));
    ctx.stages.with_engine(|engine| engine.append_confirmed(stage));
    Ok(())
}

/// Re-read one stage's cards. Skipped while the stage has unsaved moves.
pub async fn refresh_stage(ctx: AppContext, stage_id: StageId) -> ApiResult<()> {
    let cards = ctx.api().list_stage_cards(&stage_id).await?;
    ctx.cards.with_engine(|engine| {
        if engine.is_pending(&stage_id) {
            debug!(stage = %stage_id, "stage busy, refresh skipped");
        } else {
            engine.replace_parent(stage_id, cards);
        }
    });
    Ok(())
}

/// Card moves are sent one request at a time, so a rejected commit may
/// leave earlier moves applied on the server.
fn needs_resync(err: &ReorderError) -> bool {
    matches!(err, ReorderError::CommitRejected { .. })
}

/// Translate a finished drag into engine coordinates. The source index is
/// looked up again so a re-render between press and release cannot skew it.
fn to_drag_result<I, P, L>(outcome: DragOutcome<I, P>, locate: L) -> Option<DragResult<I, P>>
where
    I: Clone,
    P: Clone + PartialEq,
    L: FnOnce(&I) -> Option<(P, usize)>,
{
    let (parent, index) = locate(&outcome.key)?;
    let source = DropLocation::new(parent, index);
    let destination = outcome.target.map(|slot| {
        let index = resolve_slot(&source, &slot.container, slot.index);
        DropLocation::new(slot.container, index)
    });
    Some(DragResult {
        id: outcome.key,
        source,
        destination,
    })
}

pub fn on_card_drop(ctx: AppContext, outcome: DragOutcome<CardId, StageId>) {
    let located = ctx
        .cards
        .with_engine(|engine| to_drag_result(outcome, |id| engine.locate(id).map(|(p, i)| (p.clone(), i))));
    let Some(result) = located else {
        return;
    };
    debug!(?result, "card dropped");

    let sink = CardSink::new(ctx.api());
    spawn_local(async move {
        if let Err(err) = drop_and_commit::<Card, _, _>(&ctx.cards, &sink, &result).await {
            ctx.report(&err);
            if needs_resync(&err) {
                warn!("card order may differ from the server, reloading board");
                ctx.reload();
            }
        }
    });
}

pub fn on_stage_drop(ctx: AppContext, outcome: DragOutcome<StageId, BoardId>) {
    let located = ctx
        .stages
        .with_engine(|engine| to_drag_result(outcome, |id| engine.locate(id).map(|(p, i)| (p.clone(), i))));
    let Some(result) = located else {
        return;
    };
    debug!(?result, "stage dropped");

    let sink = StageSink::new(ctx.api());
    spawn_local(async move {
        if let Err(err) = drop_and_commit::<Stage, _, _>(&ctx.stages, &sink, &result).await {
            ctx.report(&err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos_dragdrop::DropSlot;

    #[test]
    fn test_drag_result_resolves_slot_against_current_index() {
        let outcome = DragOutcome {
            key: "a",
            source: DropSlot::new("todo", 5),
            target: Some(DropSlot::new("todo", 3)),
        };
        // engine says "a" actually sits at 0 now
        let result = to_drag_result(outcome, |_| Some(("todo", 0))).unwrap();
        assert_eq!(result.source, DropLocation::new("todo", 0));
        assert_eq!(result.destination, Some(DropLocation::new("todo", 2)));
    }

    #[test]
    fn test_rejected_card_commit_needs_resync() {
        let rejected = ReorderError::CommitRejected {
            source: taskboard_core::ApiError::Network("offline".into()),
        };
        assert!(needs_resync(&rejected));

        let stale = ReorderError::UnknownParent { parent: "todo".into() };
        assert!(!needs_resync(&stale));
    }

    #[test]
    fn test_released_outside_is_cancelled() {
        let outcome = DragOutcome {
            key: "a",
            source: DropSlot::new("todo", 0),
            target: None,
        };
        let result = to_drag_result(outcome, |_| Some(("todo", 0))).unwrap();
        assert!(result.is_cancelled());
    }
}
