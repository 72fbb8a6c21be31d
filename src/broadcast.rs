use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Listener<T>(Box<dyn Fn(&T)>);

struct Inner<T> {
    value: T,
    version: u64,
    listeners: Vec<Weak<Listener<T>>>,
}

/// A single-threaded, read-only broadcast of a value to any number of subscribers.
///
/// Publishers replace the value with [Broadcast::publish]; every live subscriber is notified in
/// registration order. Subscribers are held weakly, so dropping the [Subscription] returned from
/// [Broadcast::subscribe] stops notifications before the next publish.
pub struct Broadcast<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Broadcast {
            inner: self.inner.clone(),
        }
    }
}

/// Keeps a subscriber registered for as long as it is alive.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    _listener: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Broadcast {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning it. `f` must not publish to this broadcast.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of values published so far.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value and notify subscribers. Subscribers may publish again or subscribe from
    /// within their callback; they observe the value that was current when they were invoked.
    pub fn publish(&self, value: T) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner.version += 1;
            inner.listeners.retain(|listener| listener.strong_count() > 0);
            inner.listeners.clone()
        };
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            (listener.0)(&value);
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let listener = Rc::new(Listener(Box::new(callback)));
        self.inner
            .borrow_mut()
            .listeners
            .push(Rc::downgrade(&listener));
        Subscription {
            _listener: listener,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.strong_count() > 0)
            .count()
    }
}

impl<T: fmt::Debug> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Broadcast")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}
