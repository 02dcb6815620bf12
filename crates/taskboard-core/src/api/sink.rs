//! Position Sinks
//!
//! Map commit tickets onto the backend's reorder endpoints.

use async_trait::async_trait;
use tracing::debug;

use super::wire::StageOrder;
use super::ApiClient;
use crate::domain::{BoardId, Card, CardId, Stage, StageId};
use crate::error::ApiResult;
use crate::reorder::{CommitTicket, PositionSink};

/// The two reorder endpoints the sinks talk to
#[async_trait(?Send)]
pub trait ReorderApi {
    async fn reorder_stages(&self, board: &BoardId, orders: &[StageOrder]) -> ApiResult<()>;
    async fn move_card(&self, card: &CardId, stage: &StageId, position: i32) -> ApiResult<()>;
}

#[async_trait(?Send)]
impl ReorderApi for ApiClient {
    async fn reorder_stages(&self, board: &BoardId, orders: &[StageOrder]) -> ApiResult<()> {
        ApiClient::reorder_stages(self, board, orders).await
    }

    async fn move_card(&self, card: &CardId, stage: &StageId, position: i32) -> ApiResult<()> {
        ApiClient::move_card(self, card, stage, position).await
    }
}

/// Stage order of one board, as the reorder endpoint expects it
pub fn stage_orders(stages: &[Stage]) -> Vec<StageOrder> {
    stages
        .iter()
        .enumerate()
        .map(|(index, stage)| StageOrder {
            stage_id: stage.id.clone(),
            position: index as i32,
        })
        .collect()
}

/// Sends the full stage order of every board in a ticket
#[derive(Debug, Clone)]
pub struct StageSink<A = ApiClient> {
    client: A,
}

impl<A: ReorderApi> StageSink<A> {
    pub fn new(client: A) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl<A: ReorderApi> PositionSink<Stage> for StageSink<A> {
    async fn commit(&self, ticket: &CommitTicket<Stage>) -> ApiResult<()> {
        for board in ticket.parents() {
            let orders = stage_orders(ticket.order(board).unwrap_or_default());
            debug!(board = %board, count = orders.len(), "reorder stages");
            self.client.reorder_stages(board, &orders).await?;
        }
        Ok(())
    }
}

/// Moves every card whose stage or rank changed, lowest target rank first.
/// Stops at the first rejected move; the moves before it stay applied on the
/// server.
#[derive(Debug, Clone)]
pub struct CardSink<A = ApiClient> {
    client: A,
}

impl<A: ReorderApi> CardSink<A> {
    pub fn new(client: A) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl<A: ReorderApi> PositionSink<Card> for CardSink<A> {
    async fn commit(&self, ticket: &CommitTicket<Card>) -> ApiResult<()> {
        let mut moves = ticket.changed().to_vec();
        moves.sort_by_key(|update| update.position);
        for update in &moves {
            debug!(card = %update.id, stage = %update.parent, position = update.position, "move card");
            self.client.move_card(&update.id, &update.parent, update.position).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::{ApiError, ReorderError};
    use crate::reorder::{drop_and_commit, DragResult, DropLocation, ReorderEngine};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Stages(String, Vec<(String, i32)>),
        Move(String, String, i32),
    }

    /// Records calls; the call numbered `fail_at` (zero-based) is rejected
    #[derive(Default)]
    struct RecordingApi {
        calls: RefCell<Vec<Call>>,
        fail_at: Option<usize>,
    }

    impl RecordingApi {
        fn record(&self, call: Call) -> ApiResult<()> {
            let mut calls = self.calls.borrow_mut();
            calls.push(call);
            if self.fail_at == Some(calls.len() - 1) {
                return Err(ApiError::Status {
                    status: 400,
                    message: "invalid position".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait(?Send)]
    impl ReorderApi for RecordingApi {
        async fn reorder_stages(&self, board: &BoardId, orders: &[StageOrder]) -> ApiResult<()> {
            let orders = orders
                .iter()
                .map(|o| (o.stage_id.to_string(), o.position))
                .collect();
            self.record(Call::Stages(board.to_string(), orders))
        }

        async fn move_card(&self, card: &CardId, stage: &StageId, position: i32) -> ApiResult<()> {
            self.record(Call::Move(card.to_string(), stage.to_string(), position))
        }
    }

    fn cards(stage: &str, ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Card::new(*id, id.to_string(), StageId::new(stage), i as i32))
            .collect()
    }

    fn card_drop(id: &str, from: (&str, usize), to: (&str, usize)) -> DragResult<CardId, StageId> {
        DragResult {
            id: CardId::new(id),
            source: DropLocation::new(StageId::new(from.0), from.1),
            destination: Some(DropLocation::new(StageId::new(to.0), to.1)),
        }
    }

    #[test]
    fn test_stage_orders_follow_sequence() {
        let board = BoardId::new("b1");
        let stages = vec![
            Stage::new("done", "Done", board.clone(), 5),
            Stage::new("todo", "To Do", board, 2),
        ];
        let orders = stage_orders(&stages);
        assert_eq!(orders[0].stage_id.as_str(), "done");
        assert_eq!(orders[0].position, 0);
        assert_eq!(orders[1].position, 1);
    }

    #[tokio::test]
    async fn test_stage_sink_sends_full_board_order() {
        let board = BoardId::new("b1");
        let mut engine = ReorderEngine::new();
        engine.replace_parent(
            board.clone(),
            vec![
                Stage::new("todo", "To Do", board.clone(), 0),
                Stage::new("doing", "Doing", board.clone(), 1),
                Stage::new("done", "Done", board.clone(), 2),
            ],
        );
        let engine = RefCell::new(engine);
        let sink = StageSink::new(RecordingApi::default());

        let result = DragResult {
            id: StageId::new("done"),
            source: DropLocation::new(board.clone(), 2),
            destination: Some(DropLocation::new(board, 0)),
        };
        drop_and_commit::<Stage, _, _>(&engine, &sink, &result).await.unwrap();

        let calls = sink.client.calls.borrow();
        let expected = vec![
            ("done".to_string(), 0),
            ("todo".to_string(), 1),
            ("doing".to_string(), 2),
        ];
        assert_eq!(*calls, vec![Call::Stages("b1".into(), expected)]);
    }

    #[tokio::test]
    async fn test_card_sink_moves_changed_cards_lowest_rank_first() {
        let mut engine = ReorderEngine::new();
        engine.replace_parent(StageId::new("todo"), cards("todo", &["A", "B", "C"]));
        engine.replace_parent(StageId::new("done"), cards("done", &["X"]));
        let engine = RefCell::new(engine);
        let sink = CardSink::new(RecordingApi::default());

        // C moves to the top of done; A and B keep their ranks, X shifts down
        drop_and_commit::<Card, _, _>(&engine, &sink, &card_drop("C", ("todo", 2), ("done", 0)))
            .await
            .unwrap();

        let calls = sink.client.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                Call::Move("C".into(), "done".into(), 0),
                Call::Move("X".into(), "done".into(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_card_sink_stops_at_first_rejected_move() {
        let mut engine = ReorderEngine::new();
        engine.replace_parent(StageId::new("todo"), cards("todo", &["A", "B", "C"]));
        let engine = RefCell::new(engine);
        let sink = CardSink::new(RecordingApi {
            calls: RefCell::new(Vec::new()),
            fail_at: Some(1),
        });

        // C to the top: C, A and B all change rank
        let err = drop_and_commit::<Card, _, _>(&engine, &sink, &card_drop("C", ("todo", 2), ("todo", 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::CommitRejected { .. }));

        // the first move reached the server before the second was rejected
        let calls = sink.client.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                Call::Move("C".into(), "todo".into(), 0),
                Call::Move("A".into(), "todo".into(), 1),
            ]
        );

        let order: Vec<String> = engine
            .borrow()
            .sequence(&StageId::new("todo"))
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }
}
