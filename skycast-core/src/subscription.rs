use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity used to group a component's registrations so they can be
/// replaced or released together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Mint a process-unique owner identity.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.as_u64())
    }
}

/// RAII handle for one registration on an `ObservableValue` or `EventBus`.
///
/// Dropping the handle releases exactly the registration it was returned
/// for. Call [`Subscription::detach`] to keep the registration alive until the
/// owner is released explicitly.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Release the registration now.
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Keep the registration alive past this handle. It then lives until
    /// `unsubscribe(owner)` / `unsubscribe_all(owner)` is called.
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("attached", &self.release.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    #[test]
    fn owner_ids_are_unique() {
        let a = OwnerId::new();
        let b = OwnerId::new();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
        assert_eq!(b.to_string(), format!("owner#{}", b.as_u64()));
    }

    #[test]
    fn drop_runs_release_once() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let sub = Subscription::new(move || counter.set(counter.get() + 1));

        drop(sub);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn detach_skips_release() {
        let released = Rc::new(Cell::new(false));
        let flag = released.clone();
        Subscription::new(move || flag.set(true)).detach();

        assert!(!released.get());
    }
}
