//! Reorder Engine
//!
//! Keeps per-parent ordered sequences (stages within a board, cards within a
//! stage) and synchronizes them with the remote `position` field.
//!
//! Gestures mutate the local sequence immediately. Commits are serialized:
//! a parent has at most one commit in flight, and a gesture that touches a
//! busy parent only marks it dirty. Dirty parents are resent together, as one
//! full-state ticket, once none of them is in flight. Rollback restores the
//! latest confirmed server order, or for a parent another ticket still holds,
//! the order that ticket sent.

mod commit;
mod drag;


use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::domain::Orderable;
use crate::error::{ApiResult, ReorderError, ReorderResult};

pub use commit::{commit_positions, drop_and_commit, CommitTicket, EngineCell, PositionSink, PositionUpdate};
pub use drag::{resolve_slot, DragResult, DropLocation};

/// Optimistic, serialized ordering of entities under their parents
#[derive(Debug, Clone)]
pub struct ReorderEngine<T: Orderable> {
    /// What the user sees
    sequences: HashMap<T::Parent, Vec<T>>,
    /// Last order the server acknowledged
    confirmed: HashMap<T::Parent, Vec<T>>,
    /// Parent -> sequence number of the ticket holding it
    in_flight: HashMap<T::Parent, u64>,
    /// Order each in-flight ticket sent, per parent
    sent: HashMap<T::Parent, Vec<T>>,
    /// Parents with optimistic changes not yet sent, in gesture order
    dirty: Vec<T::Parent>,
    next_seq: u64,
}

impl<T: Orderable> Default for ReorderEngine<T> {
    fn default() -> Self {
        Self {
            sequences: HashMap::new(),
            confirmed: HashMap::new(),
            in_flight: HashMap::new(),
            sent: HashMap::new(),
            dirty: Vec::new(),
            next_seq: 1,
        }
    }
}

impl<T: Orderable> ReorderEngine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Loading & Reads
    // ========================

    /// Install a freshly loaded sequence as both local and confirmed state.
    /// Entities are ordered by position, ties broken by id.
    pub fn replace_parent(&mut self, parent: T::Parent, mut entities: Vec<T>) {
        entities.sort_by(|a, b| a.position().cmp(&b.position()).then_with(|| a.id().cmp(b.id())));
        self.in_flight.remove(&parent);
        self.sent.remove(&parent);
        self.dirty.retain(|p| *p != parent);
        self.confirmed.insert(parent.clone(), entities.clone());
        self.sequences.insert(parent, entities);
    }

    /// Drop every parent and pending commit
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Current (possibly optimistic) order of a parent
    pub fn sequence(&self, parent: &T::Parent) -> &[T] {
        self.sequences.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Last server-acknowledged order of a parent
    pub fn confirmed(&self, parent: &T::Parent) -> &[T] {
        self.confirmed.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entity under every parent, in no particular parent order
    pub fn entities(&self) -> impl Iterator<Item = &T> {
        self.sequences.values().flatten()
    }

    /// Where an entity currently lives
    pub fn locate(&self, id: &T::Id) -> Option<(&T::Parent, usize)> {
        self.sequences.iter().find_map(|(parent, seq)| {
            seq.iter().position(|e| e.id() == id).map(|index| (parent, index))
        })
    }

    /// Parent has a commit in flight or changes waiting to be sent
    pub fn is_pending(&self, parent: &T::Parent) -> bool {
        self.in_flight.contains_key(parent) || self.dirty.contains(parent)
    }

    /// Position a newly created entity should get under `parent`
    pub fn next_position(&self, parent: &T::Parent) -> i32 {
        self.sequence(parent).len() as i32
    }

    // ========================
    // Server-Confirmed Edits
    // ========================

    /// Append an entity the server already created
    pub fn append_confirmed(&mut self, entity: T) {
        let parent = entity.parent().clone();
        self.confirmed.entry(parent.clone()).or_default().push(entity.clone());
        self.sequences.entry(parent).or_default().push(entity);
    }

    // ========================
    // Optimistic Gestures
    // ========================

    /// Move the element at `from` to `to` within one parent.
    /// Returns `false` for a no-op that needs no commit.
    pub fn reorder_within(&mut self, parent: &T::Parent, from: usize, to: usize) -> ReorderResult<bool> {
        let seq = self
            .sequences
            .get_mut(parent)
            .ok_or_else(|| ReorderError::UnknownParent { parent: format!("{:?}", parent) })?;

        let len = seq.len();
        for index in [from, to] {
            if index >= len {
                return Err(ReorderError::IndexOutOfBounds {
                    parent: format!("{:?}", parent),
                    index,
                    len,
                });
            }
        }
        if from == to {
            return Ok(false);
        }

        let moved = seq.remove(from);
        debug!(parent = ?parent, from, to, id = ?moved.id(), "reorder within parent");
        seq.insert(to, moved);
        renumber(seq);
        Ok(true)
    }

    /// Move entity `id` from `source[from]` to `dest[to]`. The entity ends up
    /// in exactly one sequence whatever the outcome.
    pub fn move_across(
        &mut self,
        source: &T::Parent,
        dest: &T::Parent,
        from: usize,
        to: usize,
        id: &T::Id,
    ) -> ReorderResult<bool> {
        self.check_entity_at(source, from, id)?;
        if source == dest {
            return self.reorder_within(source, from, to);
        }

        let dest_len = self
            .sequences
            .get(dest)
            .ok_or_else(|| ReorderError::UnknownParent { parent: format!("{:?}", dest) })?
            .len();
        if to > dest_len {
            return Err(ReorderError::IndexOutOfBounds {
                parent: format!("{:?}", dest),
                index: to,
                len: dest_len,
            });
        }

        // Both parents exist and both indices are valid past this point.
        let mut moved = match self.sequences.get_mut(source) {
            Some(seq) => {
                let moved = seq.remove(from);
                renumber(seq);
                moved
            }
            None => return Err(ReorderError::UnknownParent { parent: format!("{:?}", source) }),
        };
        moved.set_parent(dest.clone());
        debug!(source = ?source, dest = ?dest, from, to, id = ?id, "move across parents");

        if let Some(seq) = self.sequences.get_mut(dest) {
            seq.insert(to, moved);
            renumber(seq);
        }
        Ok(true)
    }

    /// Apply a finished drag. Returns the parents that changed and need a
    /// commit; empty for cancelled or no-op gestures.
    pub fn apply_drop(&mut self, result: &DragResult<T::Id, T::Parent>) -> ReorderResult<Vec<T::Parent>> {
        let Some(dest) = &result.destination else {
            debug!(id = ?result.id, "drop cancelled");
            return Ok(Vec::new());
        };

        let source = &result.source;
        let changed = self.move_across(&source.parent, &dest.parent, source.index, dest.index, &result.id)?;
        if !changed {
            return Ok(Vec::new());
        }

        let mut touched = vec![dest.parent.clone()];
        if source.parent != dest.parent {
            touched.push(source.parent.clone());
        }
        Ok(touched)
    }

    fn check_entity_at(&self, parent: &T::Parent, index: usize, id: &T::Id) -> ReorderResult<()> {
        let seq = self
            .sequences
            .get(parent)
            .ok_or_else(|| ReorderError::UnknownParent { parent: format!("{:?}", parent) })?;
        let entity = seq.get(index).ok_or_else(|| ReorderError::IndexOutOfBounds {
            parent: format!("{:?}", parent),
            index,
            len: seq.len(),
        })?;
        if entity.id() != id {
            return Err(ReorderError::EntityMismatch {
                parent: format!("{:?}", parent),
                index,
                expected: format!("{:?}", id),
                found: format!("{:?}", entity.id()),
            });
        }
        Ok(())
    }

    // ========================
    // Commit & Reconcile
    // ========================

    /// Start a commit for `parents`.
    ///
    /// Returns `None` when the parents (or changes queued with them) overlap
    /// a commit in flight; they are marked dirty and resent when it settles.
    pub fn begin_commit(&mut self, parents: &[T::Parent]) -> Option<CommitTicket<T>> {
        for parent in parents {
            if self.sequences.contains_key(parent) && !self.dirty.contains(parent) {
                self.dirty.push(parent.clone());
            }
        }

        if self.dirty.is_empty() {
            return None;
        }
        if self.dirty.iter().any(|p| self.in_flight.contains_key(p)) {
            debug!(dirty = ?self.dirty, "commit queued behind in-flight commit");
            return None;
        }

        let parents = std::mem::take(&mut self.dirty);
        Some(self.issue(parents))
    }

    /// Settle a ticket. On success the sent order becomes confirmed and any
    /// follow-up ticket is returned; on failure the ticket's parents and all
    /// queued changes roll back (see module docs for the target order).
    pub fn reconcile(&mut self, ticket: CommitTicket<T>, outcome: ApiResult<()>) -> ReorderResult<Option<CommitTicket<T>>> {
        let seq = ticket.seq;
        let mut owned = Vec::new();
        for (parent, order) in ticket.orders {
            // Reloaded while in flight: the fresh load wins.
            if self.in_flight.get(&parent) == Some(&seq) {
                self.in_flight.remove(&parent);
                self.sent.remove(&parent);
                owned.push((parent, order));
            }
        }

        match outcome {
            Ok(()) => {
                for (parent, order) in owned {
                    if !self.dirty.contains(&parent) {
                        self.sequences.insert(parent.clone(), order.clone());
                    }
                    self.confirmed.insert(parent, order);
                }
                debug!(seq, "commit confirmed");

                if self.dirty.is_empty() || self.dirty.iter().any(|p| self.in_flight.contains_key(p)) {
                    return Ok(None);
                }
                let parents = std::mem::take(&mut self.dirty);
                Ok(Some(self.issue(parents)))
            }
            Err(err) => {
                let mut restore: Vec<T::Parent> = owned.into_iter().map(|(parent, _)| parent).collect();
                for parent in std::mem::take(&mut self.dirty) {
                    if !restore.contains(&parent) {
                        restore.push(parent);
                    }
                }
                warn!(seq, error = %err, parents = ?restore, "commit failed, rolling back");
                for parent in restore {
                    // A parent still held by another ticket rolls back to what
                    // that ticket sent, so entities it moved out stay out.
                    let order = self
                        .sent
                        .get(&parent)
                        .or_else(|| self.confirmed.get(&parent))
                        .cloned()
                        .unwrap_or_default();
                    self.sequences.insert(parent, order);
                }
                Err(ReorderError::CommitRejected { source: err })
            }
        }
    }

    fn issue(&mut self, parents: Vec<T::Parent>) -> CommitTicket<T> {
        let seq = self.next_seq;
        self.next_seq += 1;

        let mut confirmed_at = HashMap::new();
        for parent in &parents {
            for (index, entity) in self.confirmed(parent).iter().enumerate() {
                confirmed_at.insert(entity.id().clone(), (parent.clone(), index as i32));
            }
        }

        let mut orders = Vec::with_capacity(parents.len());
        let mut changed = Vec::new();
        let mut seen = HashSet::new();
        for parent in parents {
            if !seen.insert(parent.clone()) {
                continue;
            }
            let order = self.sequence(&parent).to_vec();
            for (index, entity) in order.iter().enumerate() {
                let position = index as i32;
                let unchanged = matches!(
                    confirmed_at.get(entity.id()),
                    Some((p, pos)) if *p == parent && *pos == position
                );
                if !unchanged {
                    changed.push(PositionUpdate {
                        id: entity.id().clone(),
                        parent: parent.clone(),
                        position,
                    });
                }
            }
            self.in_flight.insert(parent.clone(), seq);
            self.sent.insert(parent.clone(), order.clone());
            orders.push((parent, order));
        }

        CommitTicket { seq, orders, changed }
    }
}

/// Position = index for every element
fn renumber<T: Orderable>(seq: &mut [T]) {
    for (index, entity) in seq.iter_mut().enumerate() {
        entity.set_position(index as i32);
    }
}
