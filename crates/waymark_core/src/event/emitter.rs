//! Generic subscription hub.
//!
//! # Responsibility
//! - Fan out values to registered callbacks.
//! - Hand out guard objects that unsubscribe on drop, on every exit path.

use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slots<T> {
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

impl<T> Slots<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

/// Multi-subscriber event hub. Cloning shares the subscriber list.
pub struct Emitter<T> {
    slots: Arc<Mutex<Slots<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots::new())),
        }
    }

    /// Registers a callback and returns its detach guard.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            let id = slots.next_id;
            slots.next_id += 1;
            slots.subscribers.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<Slots<T>>> = Arc::downgrade(&self.slots);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    let mut slots = slots.lock().unwrap_or_else(|e| e.into_inner());
                    slots.subscribers.retain(|(slot_id, _)| *slot_id != id);
                }
            })),
        }
    }

    /// Delivers `value` to every current subscriber.
    ///
    /// The subscriber list is snapshotted first; callbacks run without
    /// the lock held.
    pub fn emit(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = {
            let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };
        for callback in callbacks {
            callback(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .len()
    }
}

/// Guard for one registered callback; detaches it when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keeps the callback registered for the emitter's whole lifetime.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
