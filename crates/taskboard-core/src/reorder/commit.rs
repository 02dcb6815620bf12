//! Commit Tickets and the Async Commit Loop
//!
//! A ticket is an immutable snapshot of the full order of one or more
//! parents. The engine hands it out, a [`PositionSink`] sends it, and the
//! engine reconciles the outcome. Engine state is only touched between
//! awaits.

use std::cell::RefCell;

use async_trait::async_trait;
use tracing::debug;

use super::drag::DragResult;
use super::ReorderEngine;
use crate::domain::Orderable;
use crate::error::{ApiResult, ReorderResult};

/// New rank of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate<I, P> {
    pub id: I,
    pub parent: P,
    pub position: i32,
}

/// Full-state commit for a set of parents
#[derive(Debug, Clone)]
pub struct CommitTicket<T: Orderable> {
    pub(super) seq: u64,
    pub(super) orders: Vec<(T::Parent, Vec<T>)>,
    pub(super) changed: Vec<PositionUpdate<T::Id, T::Parent>>,
}

impl<T: Orderable> CommitTicket<T> {
    /// Parents covered by this ticket
    pub fn parents(&self) -> impl Iterator<Item = &T::Parent> {
        self.orders.iter().map(|(parent, _)| parent)
    }

    /// Order that will be confirmed for `parent` if the commit succeeds
    pub fn order(&self, parent: &T::Parent) -> Option<&[T]> {
        self.orders
            .iter()
            .find(|(p, _)| p == parent)
            .map(|(_, seq)| seq.as_slice())
    }

    /// Every entity of every covered parent, position = index
    pub fn updates(&self) -> Vec<PositionUpdate<T::Id, T::Parent>> {
        self.orders
            .iter()
            .flat_map(|(parent, seq)| {
                seq.iter().enumerate().map(move |(index, entity)| PositionUpdate {
                    id: entity.id().clone(),
                    parent: parent.clone(),
                    position: index as i32,
                })
            })
            .collect()
    }

    /// Entities whose rank or parent differs from the last confirmed order
    pub fn changed(&self) -> &[PositionUpdate<T::Id, T::Parent>] {
        &self.changed
    }
}

/// Where committed positions go (the remote API, or a fake in tests)
#[async_trait(?Send)]
pub trait PositionSink<T: Orderable> {
    async fn commit(&self, ticket: &CommitTicket<T>) -> ApiResult<()>;
}

/// Shared access to an engine owned by the UI event loop
pub trait EngineCell<T: Orderable> {
    fn with_engine<R>(&self, f: impl FnOnce(&mut ReorderEngine<T>) -> R) -> R;
}

impl<T: Orderable> EngineCell<T> for RefCell<ReorderEngine<T>> {
    fn with_engine<R>(&self, f: impl FnOnce(&mut ReorderEngine<T>) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// Send the current order of `parents` and reconcile, following up with
/// queued resends until nothing is left for this call to do.
pub async fn commit_positions<T, C, S>(engine: &C, sink: &S, parents: &[T::Parent]) -> ReorderResult<()>
where
    T: Orderable,
    C: EngineCell<T>,
    S: PositionSink<T> + ?Sized,
{
    let mut next = engine.with_engine(|e| e.begin_commit(parents));
    while let Some(ticket) = next {
        debug!(seq = ticket.seq, parents = ?ticket.parents().collect::<Vec<_>>(), "sending positions");
        let outcome = sink.commit(&ticket).await;
        next = engine.with_engine(|e| e.reconcile(ticket, outcome))?;
    }
    Ok(())
}

/// Apply a finished drag optimistically, then commit the touched parents
pub async fn drop_and_commit<T, C, S>(
    engine: &C,
    sink: &S,
    result: &DragResult<T::Id, T::Parent>,
) -> ReorderResult<()>
where
    T: Orderable,
    C: EngineCell<T>,
    S: PositionSink<T> + ?Sized,
{
    let touched = engine.with_engine(|e| e.apply_drop(result))?;
    if touched.is_empty() {
        return Ok(());
    }
    commit_positions(engine, sink, &touched).await
}
