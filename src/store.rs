use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::value::SubscriptionId;

/// Callback type for value change notifications.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A single observable value.
///
/// Contract:
/// - `subscribe` hands the current value to the new listener right away,
///   then every value passed to `set` afterwards.
/// - any number of listeners may be registered at once.
pub trait Observable<T>: Send + Sync {
    /// Current value.
    fn get(&self) -> T;

    /// Replace the value and notify every listener.
    fn set(&self, value: T);

    /// Register a listener. It is called once immediately with the
    /// current value.
    fn subscribe(&self, listener: Listener<T>) -> SubscriptionId;

    /// Remove a listener. Unknown IDs are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// In-process writable value with synchronous listeners.
///
/// - `set(value)` stores the value and notifies all listeners.
/// - `get()` returns a clone of the current value.
/// - `subscribe(listener)` registers a listener and calls it with the
///   current value.
/// - `unsubscribe(id)` removes a listener.
///
/// Listeners run on the thread that calls `set`, after the value lock is
/// released, so a listener may call `get()`.
pub struct Writable<T> {
    value: RwLock<T>,
    listeners: RwLock<Vec<ListenerEntry<T>>>,
    /// Monotonic counter for subscription IDs.
    next_id: AtomicU64,
}

struct ListenerEntry<T> {
    id: SubscriptionId,
    listener: Listener<T>,
}

impl<T> Clone for ListenerEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Writable<T> {
    /// Create a writable holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    fn snapshot_listeners(&self) -> Vec<ListenerEntry<T>> {
        self.listeners.read().unwrap().clone()
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for Writable<T> {
    fn get(&self) -> T {
        self.value.read().unwrap().clone()
    }

    fn set(&self, value: T) {
        {
            let mut current = self.value.write().unwrap();
            *current = value.clone();
        }
        for entry in self.snapshot_listeners() {
            (entry.listener)(&value);
        }
    }

    fn subscribe(&self, listener: Listener<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push(ListenerEntry {
            id,
            listener: Arc::clone(&listener),
        });
        let current = self.get();
        listener(&current);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.write().unwrap().retain(|entry| entry.id != id);
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, Listener<u32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();
        let listener: Listener<u32> = Arc::new(move |v: &u32| seen_c.lock().unwrap().push(*v));
        (seen, listener)
    }

    // ========================================================================
    // Basic get/set
    // ========================================================================

    #[test]
    fn new_holds_initial() {
        let w = Writable::new(7u32);
        assert_eq!(w.get(), 7);
    }

    #[test]
    fn set_overwrites() {
        let w = Writable::new(1u32);
        w.set(2);
        w.set(3);
        assert_eq!(w.get(), 3);
    }

    #[test]
    fn default_uses_type_default() {
        let w: Writable<String> = Writable::default();
        assert_eq!(w.get(), "");
    }

    // ========================================================================
    // Subscribe
    // ========================================================================

    #[test]
    fn subscribe_delivers_current_value_immediately() {
        let w = Writable::new(5u32);
        let (seen, listener) = recorder();

        w.subscribe(listener);
        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[test]
    fn subscribe_sees_every_set() {
        let w = Writable::new(0u32);
        let (seen, listener) = recorder();

        w.subscribe(listener);
        w.set(1);
        w.set(2);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn multiple_subscribers() {
        let w = Writable::new(0u32);
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();

        w.subscribe(a);
        w.set(1);
        w.subscribe(b);
        w.set(2);

        assert_eq!(*seen_a.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(*seen_b.lock().unwrap(), vec![1, 2]);
        assert_eq!(w.listener_count(), 2);
    }

    // ========================================================================
    // Unsubscribe
    // ========================================================================

    #[test]
    fn unsubscribe_stops_notifications() {
        let w = Writable::new(0u32);
        let (seen, listener) = recorder();

        let id = w.subscribe(listener);
        w.set(1);
        w.unsubscribe(id);
        w.set(2);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
        assert_eq!(w.listener_count(), 0);
    }

    #[test]
    fn unsubscribe_one_keeps_others() {
        let w = Writable::new(0u32);
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();

        let id_a = w.subscribe(a);
        let _id_b = w.subscribe(b);
        w.unsubscribe(id_a);
        w.set(9);

        assert_eq!(*seen_a.lock().unwrap(), vec![0]);
        assert_eq!(*seen_b.lock().unwrap(), vec![0, 9]);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let w = Writable::new(0u32);
        w.unsubscribe(SubscriptionId(999));
    }

    #[test]
    fn subscription_ids_are_unique() {
        let w = Writable::new(0u32);
        let id1 = w.subscribe(Arc::new(|_: &u32| {}));
        let id2 = w.subscribe(Arc::new(|_: &u32| {}));
        assert_ne!(id1, id2);
    }

    // ========================================================================
    // Re-entrancy / threads
    // ========================================================================

    #[test]
    fn listener_can_read_store() {
        let w = Arc::new(Writable::new(0u32));
        let w_c = w.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();

        w.subscribe(Arc::new(move |_: &u32| {
            seen_c.lock().unwrap().push(w_c.get());
        }));
        w.set(4);

        assert_eq!(*seen.lock().unwrap(), vec![0, 4]);
    }

    #[test]
    fn concurrent_set_and_subscribe() {
        use std::sync::atomic::AtomicU64;
        use std::thread;

        let w = Arc::new(Writable::new(0u32));
        let total = Arc::new(AtomicU64::new(0));
        let total_c = total.clone();
        w.subscribe(Arc::new(move |_: &u32| {
            total_c.fetch_add(1, Ordering::Relaxed);
        }));

        let mut handles = vec![];
        for t in 0..4u32 {
            let w_c = w.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100u32 {
                    w_c.set(t * 100 + i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // One immediate delivery plus 400 sets.
        assert_eq!(total.load(Ordering::Relaxed), 401);
    }
}
