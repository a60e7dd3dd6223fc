//! Publish/subscribe registry keyed by [`EventKind`].
//!
//! One `EventBus` is created at start-up and handed to every component that
//! needs it; clones share the same registry. Delivery is synchronous and in
//! registration order. Like [`crate::ObservableValue`], the bus is confined to a
//! single thread and does no locking.
//!
//! A callback running for kind `K` must not publish `K` again. The bus does not
//! crash if that happens, but the order in which the nested payload reaches
//! subscribers is unspecified.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, trace, warn};

use crate::subscription::{OwnerId, Subscription};

pub mod event;

pub use event::{Event, EventKind};

type Callback = Rc<dyn Fn(&Event)>;

struct Entry {
    id: u64,
    owner: OwnerId,
    sticky: bool,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<EventKind, Vec<Entry>>,
    retained: HashMap<EventKind, Event>,
    dispatching: HashSet<EventKind>,
}

impl Registry {
    fn is_live(&self, kind: EventKind, id: u64) -> bool {
        self.entries.get(&kind).is_some_and(|list| list.iter().any(|e| e.id == id))
    }

    fn remove_id(&mut self, kind: EventKind, id: u64) {
        if let Some(list) = self.entries.get_mut(&kind) {
            list.retain(|e| e.id != id);
        }
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain registration: the callback sees future publishes of `kind` only.
    pub fn subscribe<F>(&self, owner: OwnerId, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) + 'static,
    {
        self.register(owner, kind, false, Rc::new(callback))
    }

    /// Like [`EventBus::subscribe`], but if a sticky payload is retained for
    /// `kind` the callback receives it right away.
    pub fn subscribe_sticky<F>(&self, owner: OwnerId, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) + 'static,
    {
        let callback: Callback = Rc::new(callback);

        let retained = self.registry.borrow().retained.get(&kind).cloned();
        if let Some(event) = retained {
            trace!(%owner, %kind, "replaying sticky event");
            callback(&event);
        }

        self.register(owner, kind, true, callback)
    }

    fn register(&self, owner: OwnerId, kind: EventKind, sticky: bool, callback: Callback) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.entries.entry(kind).or_default().push(Entry { id, owner, sticky, callback });
            id
        };
        debug!(%owner, %kind, sticky, "bus subscription added");

        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().remove_id(kind, id);
            }
        })
    }

    /// Deliver `event` to the current subscribers of its kind. Nothing is
    /// retained.
    pub fn publish(&self, event: Event) {
        self.dispatch(&event);
    }

    /// Retain `event` as the latest payload of its kind, replacing any earlier
    /// one, then deliver it like [`EventBus::publish`].
    pub fn publish_sticky(&self, event: Event) {
        self.registry.borrow_mut().retained.insert(event.kind(), event.clone());
        self.dispatch(&event);
    }

    fn dispatch(&self, event: &Event) {
        let kind = event.kind();

        let (outermost, targets) = {
            let mut registry = self.registry.borrow_mut();
            let outermost = registry.dispatching.insert(kind);
            if !outermost {
                warn!(%kind, "re-entrant publish of the kind currently being dispatched");
            }
            let targets: Vec<(u64, Callback)> = registry
                .entries
                .get(&kind)
                .map(|list| list.iter().map(|e| (e.id, Rc::clone(&e.callback))).collect())
                .unwrap_or_default();
            (outermost, targets)
        };

        debug!(%kind, subscribers = targets.len(), "publishing event");

        for (id, callback) in targets {
            if self.registry.borrow().is_live(kind, id) {
                callback(event);
            }
        }

        if outermost {
            self.registry.borrow_mut().dispatching.remove(&kind);
        }
    }

    /// The retained sticky payload of `kind`, if any.
    pub fn sticky(&self, kind: EventKind) -> Option<Event> {
        self.registry.borrow().retained.get(&kind).cloned()
    }

    /// Remove and return the retained sticky payload of `kind`, so later
    /// sticky subscribers no longer see it.
    pub fn take_sticky(&self, kind: EventKind) -> Option<Event> {
        self.registry.borrow_mut().retained.remove(&kind)
    }

    /// Remove `owner`'s registrations for one kind.
    pub fn unsubscribe(&self, owner: OwnerId, kind: EventKind) {
        if let Some(list) = self.registry.borrow_mut().entries.get_mut(&kind) {
            list.retain(|e| e.owner != owner);
        }
    }

    /// Remove every registration of `owner`, across all kinds. Components call
    /// this on teardown.
    pub fn unsubscribe_all(&self, owner: OwnerId) {
        let mut registry = self.registry.borrow_mut();
        let mut removed = 0;
        for list in registry.entries.values_mut() {
            let before = list.len();
            list.retain(|e| e.owner != owner);
            removed += before - list.len();
        }
        debug!(%owner, removed, "bus owner released");
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry.borrow().entries.get(&kind).map_or(0, Vec::len)
    }

    pub fn sticky_subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .borrow()
            .entries
            .get(&kind)
            .map_or(0, |list| list.iter().filter(|e| e.sticky).count())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let subscriptions: usize = registry.entries.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscriptions", &subscriptions)
            .field("retained", &registry.retained.len())
            .finish()
    }
}
