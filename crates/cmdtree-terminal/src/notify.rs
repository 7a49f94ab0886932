//! History change notifications.
//!
//! Listeners fire inline by default. In deferred mode events queue up until
//! [`Notifier::drain`] is called, typically once per frame from the thread
//! that owns the UI.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    CommandHistoryChanged,
    LineHistoryChanged,
    CommandLimitChanged(usize),
    LineLimitChanged(usize),
}

/// A notification sink.
///
/// Listeners run with no internal lock held, so they may call back into the
/// handler. A listener subscribed from inside a callback sees the next
/// event, not the current one.
pub type Listener = Arc<dyn Fn(&HistoryEvent) + Send + Sync>;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub(crate) struct Notifier {
    listeners: Mutex<Vec<Listener>>,
    pending: Mutex<VecDeque<HistoryEvent>>,
    deferred: AtomicBool,
}

impl Notifier {
    pub(crate) fn new(deferred: bool) -> Self {
        Self {
            deferred: AtomicBool::new(deferred),
            ..Self::default()
        }
    }

    pub(crate) fn subscribe(&self, listener: Listener) {
        lock(&self.listeners).push(listener);
    }

    pub(crate) fn is_deferred(&self) -> bool {
        self.deferred.load(Ordering::Acquire)
    }

    /// Switching back to inline delivery leaves queued events for the next
    /// drain.
    pub(crate) fn set_deferred(&self, deferred: bool) {
        self.deferred.store(deferred, Ordering::Release);
    }

    pub(crate) fn emit(&self, event: HistoryEvent) {
        if self.is_deferred() {
            lock(&self.pending).push_back(event);
        } else {
            self.deliver(&event);
        }
    }

    /// Deliver every queued event. Returns how many were delivered.
    pub(crate) fn drain(&self) -> usize {
        let events: Vec<HistoryEvent> = lock(&self.pending).drain(..).collect();
        for event in &events {
            self.deliver(event);
        }
        events.len()
    }

    pub(crate) fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    fn deliver(&self, event: &HistoryEvent) {
        let listeners: Vec<Listener> = lock(&self.listeners).iter().map(Arc::clone).collect();
        for listener in &listeners {
            listener(event);
        }
    }
}
