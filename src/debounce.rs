//! Trailing-edge debounce on tokio timers.
//!
//! Each [`Debouncer::update`] cancels the pending update and schedules a new
//! one, so only the last value of a burst becomes current, `delay` after the
//! burst ends. Must be used from within a tokio runtime.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    value: Arc<Mutex<T>>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> Self {
        Self { value: Arc::new(Mutex::new(initial)), delay, pending: None }
    }

    /// Current debounced value.
    #[must_use]
    pub fn value(&self) -> T {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update(&mut self, next: T) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let slot = Arc::clone(&self.value);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = next;
        }));
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[path = "debounce_test.rs"]
mod tests;
