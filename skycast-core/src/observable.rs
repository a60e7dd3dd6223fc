//! Single-value container with synchronous change notification.
//!
//! `ObservableValue<T>` is a cheap, clonable handle over `Rc<..>` state. It is
//! meant to live on one thread (the UI thread); producers on other threads hand
//! their results over before calling [`ObservableValue::set`].
//!
//! Guarantees:
//! - subscribers are notified in subscription order;
//! - setting a value equal to the current one notifies nobody;
//! - an owner unsubscribed during a notification pass receives nothing further,
//!   including later steps of the pass already in progress;
//! - a callback that calls `set` again starts a nested pass with the newer
//!   value, and the outer pass stops there. Nobody sees a stale value after a
//!   newer one.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::subscription::{OwnerId, Subscription};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
    id: u64,
    owner: OwnerId,
    callback: Callback<T>,
}

struct Inner<T> {
    value: RefCell<T>,
    entries: RefCell<Vec<Entry<T>>>,
    next_id: Cell<u64>,
    version: Cell<u64>,
}

impl<T> Inner<T> {
    fn is_live(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|e| e.id == id)
    }

    fn remove_id(&self, id: u64) {
        self.entries.borrow_mut().retain(|e| e.id != id);
    }
}

pub struct ObservableValue<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ObservableValue<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T> ObservableValue<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial),
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                version: Cell::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of effective `set` calls so far.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Replace the value and notify every subscriber, unless `value` equals the
    /// current one. Returns whether a change happened.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            trace!("observable set skipped, value unchanged");
            return false;
        }

        *self.inner.value.borrow_mut() = value.clone();
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);

        let targets: Vec<(u64, Callback<T>)> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|e| (e.id, Rc::clone(&e.callback)))
            .collect();

        debug!(version, subscribers = targets.len(), "observable value changed");

        for (id, callback) in targets {
            if self.inner.version.get() != version {
                trace!(version, "superseded during notification");
                break;
            }
            if self.inner.is_live(id) {
                callback(&value);
            }
        }

        true
    }

    /// Register `callback` for `owner`. An existing registration of the same
    /// owner is replaced in place, keeping its position in the notification
    /// order. With `replay` the callback also runs once right away with the
    /// current value.
    pub fn subscribe<F>(&self, owner: OwnerId, replay: bool, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let callback: Callback<T> = Rc::new(callback);
        {
            let mut entries = self.inner.entries.borrow_mut();
            let entry = Entry { id, owner, callback: Rc::clone(&callback) };
            match entries.iter_mut().find(|e| e.owner == owner) {
                Some(existing) => {
                    trace!(%owner, "replacing observable subscription");
                    *existing = entry;
                }
                None => entries.push(entry),
            }
        }

        if replay {
            let current = self.get();
            callback(&current);
        }

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_id(id);
            }
        })
    }

    /// Remove `owner`'s registration if there is one.
    pub fn unsubscribe(&self, owner: OwnerId) {
        self.inner.entries.borrow_mut().retain(|e| e.owner != owner);
    }
}

impl<T> Default for ObservableValue<T>
where
    T: Clone + PartialEq + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.entries.borrow().len())
            .field("version", &self.inner.version.get())
            .finish()
    }
}
