//! Typed event dispatch
//!
//! Listeners register per event kind and receive the full payload. Events
//! are plain enums owned by the embedding crate; the bus only needs to know
//! how to map a payload to its kind.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::hash::Hash;

new_key_type! {
    /// Handle returned by [`EventBus::subscribe`], used to unsubscribe
    pub struct ListenerId;
}

/// An event payload with a hashable discriminant
pub trait Event {
    type Kind: Copy + Eq + Hash;

    fn kind(&self) -> Self::Kind;
}

/// Event handler function type
pub type EventHandler<E> = Box<dyn Fn(&E) + Send + Sync>;

struct Registration<E: Event> {
    kind: E::Kind,
    handler: EventHandler<E>,
}

/// Dispatches events to registered handlers, in registration order
pub struct EventBus<E: Event> {
    listeners: SlotMap<ListenerId, Registration<E>>,
    by_kind: FxHashMap<E::Kind, Vec<ListenerId>>,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            by_kind: FxHashMap::default(),
        }
    }

    /// Register a handler for one event kind
    pub fn subscribe<F>(&mut self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.listeners.insert(Registration {
            kind,
            handler: Box::new(handler),
        });
        self.by_kind.entry(kind).or_default().push(id);
        id
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(registration) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_kind.get_mut(&registration.kind) {
            ids.retain(|&other| other != id);
        }
        true
    }

    /// Deliver an event to every handler registered for its kind
    pub fn publish(&self, event: &E) {
        let Some(ids) = self.by_kind.get(&event.kind()) else {
            return;
        };
        for id in ids {
            if let Some(registration) = self.listeners.get(*id) {
                (registration.handler)(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    enum TestEvent {
        Ping(u32),
        Pong,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestKind {
        Ping,
        Pong,
    }

    impl Event for TestEvent {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            match self {
                TestEvent::Ping(_) => TestKind::Ping,
                TestEvent::Pong => TestKind::Pong,
            }
        }
    }

    #[test]
    fn test_publish_reaches_matching_kind_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = seen.clone();
        bus.subscribe(TestKind::Ping, move |e: &TestEvent| {
            sink.lock().unwrap().push(e.clone());
        });

        bus.publish(&TestEvent::Ping(3));
        bus.publish(&TestEvent::Pong);

        assert_eq!(*seen.lock().unwrap(), vec![TestEvent::Ping(3)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();

        let c = count.clone();
        let id = bus.subscribe(TestKind::Pong, move |_: &TestEvent| {
            *c.lock().unwrap() += 1;
        });

        bus.publish(&TestEvent::Pong);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&TestEvent::Pong);

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for n in 0..3 {
            let o = order.clone();
            bus.subscribe(TestKind::Ping, move |_: &TestEvent| o.lock().unwrap().push(n));
        }
        bus.publish(&TestEvent::Ping(0));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
