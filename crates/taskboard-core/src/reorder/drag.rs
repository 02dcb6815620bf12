//! Drag Results
//!
//! What a finished drag gesture reports to the engine.

/// A slot inside a parent's sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropLocation<P> {
    pub parent: P,
    pub index: usize,
}

impl<P> DropLocation<P> {
    pub fn new(parent: P, index: usize) -> Self {
        Self { parent, index }
    }
}

/// Outcome of a drag gesture. `destination == None` means the entity was
/// released outside every drop target and the gesture is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult<I, P> {
    pub id: I,
    pub source: DropLocation<P>,
    pub destination: Option<DropLocation<P>>,
}

impl<I, P: PartialEq> DragResult<I, P> {
    pub fn is_cancelled(&self) -> bool {
        self.destination.is_none()
    }
}

/// Convert a drop-zone slot into a final index.
///
/// Zone `slot` sits before the element currently at `slot`. When the dragged
/// element comes from earlier in the same sequence, removing it shifts every
/// later element down by one.
pub fn resolve_slot<P: PartialEq>(source: &DropLocation<P>, dest_parent: &P, slot: usize) -> usize {
    if source.parent == *dest_parent && source.index < slot {
        slot - 1
    } else {
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_slot_same_parent_downward() {
        let source = DropLocation::new("todo", 0);
        // zone after the third card of [A, B, C]
        assert_eq!(resolve_slot(&source, &"todo", 3), 2);
        // zone before B is where A already is
        assert_eq!(resolve_slot(&source, &"todo", 1), 0);
    }

    #[test]
    fn test_resolve_slot_upward_and_cross_parent() {
        let source = DropLocation::new("todo", 2);
        assert_eq!(resolve_slot(&source, &"todo", 0), 0);
        assert_eq!(resolve_slot(&source, &"done", 3), 3);
    }

    #[test]
    fn test_cancelled_without_destination() {
        let cancelled = DragResult {
            id: 7,
            source: DropLocation::new("a", 1),
            destination: None,
        };
        assert!(cancelled.is_cancelled());

        let dropped = DragResult {
            id: 7,
            source: DropLocation::new("a", 1),
            destination: Some(DropLocation::new("a", 1)),
        };
        assert!(!dropped.is_cancelled());
    }
}
