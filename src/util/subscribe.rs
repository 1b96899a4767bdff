use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Callback receiving pushed values (remote snapshots, reloaded documents, ...).
pub type NextFn<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Callback receiving listener failures.
pub type ErrorFn<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

/// Handle for an active listener; the cleanup runs exactly once, on [`Subscription::unsubscribe`]
/// or when the handle is dropped.
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Creates a subscription with a cleanup callback that runs on drop.
    pub fn new<F>(cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// Returns a subscription that performs no cleanup work.
    pub fn noop() -> Self {
        Self { cleanup: None }
    }

    pub fn is_noop(&self) -> bool {
        self.cleanup.is_none()
    }

    /// Detaches the listener now instead of at drop time.
    pub fn unsubscribe(mut self) {
        self.run_cleanup();
    }

    /// Chains another cleanup step after this one.
    pub fn and_then<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let previous = self.cleanup.take();
        Self::new(move || {
            if let Some(previous) = previous {
                previous();
            }
            cleanup();
        })
    }

    fn run_cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::noop()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cleanup.is_some())
            .finish()
    }
}

/// Registry of `(id, listener)` pairs that hands out [`Subscription`]s removing their own entry.
pub struct ListenerSet<T> {
    inner: Arc<Mutex<ListenerSetInner<T>>>,
}

struct ListenerSetInner<T> {
    next_id: usize,
    listeners: Vec<(usize, T)>,
}

impl<T: Clone + Send + 'static> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerSetInner {
                next_id: 1,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn insert(&self, listener: T) -> Subscription {
        let id = {
            let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = guard.next_id;
            guard.next_id += 1;
            guard.listeners.push((id, listener));
            id
        };

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
                guard.listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Clones the current listeners so callers can invoke them without holding the lock.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
