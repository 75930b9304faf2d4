//! Pointer tracking
//!
//! [`PointerTracker`] keeps the last pointer position in surface-local
//! coordinates. [`PointerBus`] models the document-wide pointer listener:
//! backgrounds subscribe while mounted and must unsubscribe on teardown.

use crate::geometry::{ClientRect, Point};

/// Last known pointer position for one surface
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Point,
}

impl PointerTracker {
    /// Start at the surface origin, like an untouched page
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Pointer moved over the surface itself; always accepted
    pub fn on_surface_move(&mut self, client: Point, rect: &ClientRect) {
        self.position = rect.to_local(client);
    }

    /// Touch moved over the surface; only the first touch point counts
    ///
    /// Returns false when the touch list was empty.
    pub fn on_touch_move(&mut self, touches: &[Point], rect: &ClientRect) -> bool {
        match touches.first() {
            Some(first) => {
                self.on_surface_move(*first, rect);
                true
            }
            None => false,
        }
    }

    /// Pointer moved somewhere in the document
    ///
    /// Only positions inside the surface's current rectangle are kept.
    /// Returns whether the position was updated.
    pub fn on_global_move(&mut self, client: Point, rect: &ClientRect) -> bool {
        let local = rect.to_local(client);
        if rect.contains_local(local) {
            self.position = local;
            true
        } else {
            false
        }
    }
}

/// Handle returned by [`PointerBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Point)>;

/// Document-wide pointer fan-out with an explicit subscription lifecycle
///
/// Listeners receive client coordinates; converting to surface space is up to
/// each subscriber since only it knows its rectangle.
#[derive(Default)]
pub struct PointerBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every document pointer move
    pub fn subscribe(&mut self, listener: impl FnMut(Point) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver a client-space pointer position to every listener
    pub fn dispatch(&mut self, client: Point) {
        for (_, listener) in &mut self.listeners {
            listener(client);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
