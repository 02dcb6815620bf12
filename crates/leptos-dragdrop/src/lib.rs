//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for ordered lists in Leptos.
//! A movement threshold distinguishes click from drag. Targets are slots
//! `(container, index)` meaning "insert before the item currently at index".

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// How long `drag_just_ended` stays set, so the trailing click is ignored
const CLICK_SUPPRESS_MS: u32 = 100;

/// A slot inside a container's list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropSlot<C> {
    pub container: C,
    pub index: usize,
}

impl<C> DropSlot<C> {
    pub fn new(container: C, index: usize) -> Self {
        Self { container, index }
    }
}

/// The item being (or about to be) dragged and where it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragOrigin<K, C> {
    pub key: K,
    pub slot: DropSlot<C>,
}

/// A finished drag. `target == None` means released outside every drop
/// target: the gesture is cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragOutcome<K, C> {
    pub key: K,
    pub source: DropSlot<C>,
    pub target: Option<DropSlot<C>>,
}

/// Direction items are laid out in, for halving an item under the pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Cards stacked in a column
    Vertical,
    /// Columns side by side
    Horizontal,
}

/// DnD state signals
pub struct DndSignals<K: 'static, C: 'static> {
    pub dragging_read: ReadSignal<Option<DragOrigin<K, C>>>,
    pub dragging_write: WriteSignal<Option<DragOrigin<K, C>>>,
    pub drop_target_read: ReadSignal<Option<DropSlot<C>>>,
    pub drop_target_write: WriteSignal<Option<DropSlot<C>>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pressed but not yet moved past the threshold
    pub pending_read: ReadSignal<Option<DragOrigin<K, C>>>,
    pub pending_write: WriteSignal<Option<DragOrigin<K, C>>>,
    /// Pointer position at mousedown
    pub start_read: ReadSignal<(i32, i32)>,
    pub start_write: WriteSignal<(i32, i32)>,
}

impl<K, C> Clone for DndSignals<K, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C> Copy for DndSignals<K, C> {}

impl<K, C> DndSignals<K, C>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    /// Is `key` the item currently being dragged (tracked)
    pub fn is_dragging(&self, key: &K) -> bool {
        self.dragging_read.with(|d| d.as_ref().is_some_and(|o| o.key == *key))
    }

    /// Is the pointer over this slot (tracked)
    pub fn is_target(&self, container: &C, index: usize) -> bool {
        self.drop_target_read
            .with(|t| t.as_ref().is_some_and(|s| s.container == *container && s.index == index))
    }

    /// Any drag in progress (tracked)
    pub fn is_active(&self) -> bool {
        self.dragging_read.with(Option::is_some)
    }
}

pub fn create_dnd_signals<K, C>() -> DndSignals<K, C>
where
    K: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    let (dragging_read, dragging_write) = signal(None::<DragOrigin<K, C>>);
    let (drop_target_read, drop_target_write) = signal(None::<DropSlot<C>>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_read, pending_write) = signal(None::<DragOrigin<K, C>>);
    let (start_read, start_write) = signal((0i32, 0i32));
    DndSignals {
        dragging_read,
        dragging_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_read,
        pending_write,
        start_read,
        start_write,
    }
}

/// End drag operation
pub fn end_drag<K, C>(dnd: &DndSignals<K, C>)
where
    K: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    dnd.dragging_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_write.set(None);
    dnd.drag_just_ended_write.set(true);

    let clear = dnd.drag_just_ended_write;
    Timeout::new(CLICK_SUPPRESS_MS, move || clear.set(false)).forget();
}

/// Create mousedown handler for a draggable item at `slot`.
/// Records a pending drag; the press does not reach enclosing draggables.
pub fn make_on_mousedown<K, C>(dnd: DndSignals<K, C>, key: K, slot: DropSlot<C>) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    K: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        ev.stop_propagation();
        dnd.pending_write.set(Some(DragOrigin {
            key: key.clone(),
            slot: slot.clone(),
        }));
        dnd.start_write.set((ev.client_x(), ev.client_y()));
    }
}

/// Document mousemove: promotes a pending press to a drag once the pointer
/// moves past the threshold
pub fn bind_global_mousemove<K, C>(dnd: DndSignals<K, C>)
where
    K: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if dnd.dragging_read.with_untracked(Option::is_some) {
            return;
        }
        let Some(pending) = dnd.pending_read.get_untracked() else {
            return;
        };

        let (start_x, start_y) = dnd.start_read.get_untracked();
        let dx = (ev.client_x() - start_x).abs();
        let dy = (ev.client_y() - start_y).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            dnd.dragging_write.set(Some(pending));
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
}

/// Mousemove over an item at `index`: the nearer half decides whether the
/// slot is before or after it
pub fn make_on_item_mousemove<K, C>(dnd: DndSignals<K, C>, container: C, index: usize, axis: Axis) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    K: Clone + Send + Sync + 'static,
    C: Clone + PartialEq + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if dnd.dragging_read.with_untracked(Option::is_none) {
            return;
        }
        let Some(element) = ev.current_target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return;
        };

        let rect = element.get_bounding_client_rect();
        let after = match axis {
            Axis::Vertical => f64::from(ev.client_y()) > rect.top() + rect.height() / 2.0,
            Axis::Horizontal => f64::from(ev.client_x()) > rect.left() + rect.width() / 2.0,
        };
        let slot = DropSlot::new(container.clone(), if after { index + 1 } else { index });

        if dnd.drop_target_read.with_untracked(|t| t.as_ref() != Some(&slot)) {
            dnd.drop_target_write.set(Some(slot));
        }
    }
}

/// Mouseenter on an explicit zone (empty column, end of list). `index` is
/// read at hover time, so a tail zone can follow a growing list.
pub fn make_on_zone_mouseenter<K, C, F>(dnd: DndSignals<K, C>, container: C, index: F) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    K: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    F: Fn() -> usize + Clone + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.with_untracked(Option::is_some) {
            dnd.drop_target_write.set(Some(DropSlot::new(container.clone(), index())));
        }
    }
}

/// Mouseleave on a container: pointer is no longer over any slot of it
pub fn make_on_mouseleave<K, C>(dnd: DndSignals<K, C>) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.with_untracked(Option::is_some) {
            dnd.drop_target_write.set(None);
        }
    }
}

/// Bind global mouseup for drop detection. `on_drop` runs for every real
/// drag, including cancelled ones; plain clicks never reach it.
pub fn bind_global_mouseup<K, C, F>(dnd: DndSignals<K, C>, on_drop: F)
where
    K: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    F: Fn(DragOutcome<K, C>) + 'static,
{
    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_read.get_untracked();
        let target = dnd.drop_target_read.get_untracked();

        if let Some(origin) = dragging {
            end_drag(&dnd);
            on_drop(DragOutcome {
                key: origin.key,
                source: origin.slot,
                target,
            });
        } else {
            // Plain click; let it through
            dnd.pending_write.set(None);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd);
}
