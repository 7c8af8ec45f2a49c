//! Side effects the core asks the view layer to perform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session operations end in a transient notice and sometimes a navigation.
//! How those are shown is owned by whoever renders the app, so the core only
//! talks to the [`UiEffects`] trait.

use std::sync::{Mutex, PoisonError};

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub trait UiEffects: Send + Sync {
    fn notify(&self, notice: Notice);
    fn navigate(&self, path: &str);
}

/// One recorded effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notice(Notice),
    Navigate(String),
}

/// Effects sink that records everything in order.
///
/// The CLI drains it after each command to render notices; tests use it to
/// assert on side effects.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    effects: Mutex<Vec<Effect>>,
}

impl RecordingEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded effects.
    pub fn take(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.effects.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Paths navigated to so far, without draining.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|e| match e {
                Effect::Navigate(path) => Some(path.clone()),
                Effect::Notice(_) => None,
            })
            .collect()
    }

    fn push(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl UiEffects for RecordingEffects {
    fn notify(&self, notice: Notice) {
        self.push(Effect::Notice(notice));
    }

    fn navigate(&self, path: &str) {
        self.push(Effect::Navigate(path.to_owned()));
    }
}
