//! The silence timer.
//!
//! A single outstanding "fire after duration D" schedule that can be
//! cancelled or re-armed in O(1). The guarantee callers rely on: only the
//! most recently armed schedule may ever fire. Aborting the previous task is
//! the fast path, but abort alone cannot close the race where a task has
//! already passed its sleep when the abort lands. The generation counter
//! closes it: every arm/cancel bumps the generation, the fire callback
//! receives the generation it was armed with, and the detector checks
//! [`SilenceTimer::is_current`] while holding its state lock before acting.
//! A superseded fire is then a no-op regardless of scheduling order.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

/// A cancellable, restartable one-shot timer.
///
/// Negative durations are unrepresentable by `std::time::Duration`, so there
/// is no runtime argument validation to do here; misconfigured timeouts are
/// rejected earlier, at config validation.
#[derive(Debug, Default)]
pub(crate) struct SilenceTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl SilenceTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending schedule and start a new one.
    ///
    /// After `duration`, `fire` is invoked with this schedule's generation
    /// token, unless the timer is cancelled or re-armed first. Must be called
    /// from within a tokio runtime.
    ///
    /// Returns the generation token of the new schedule.
    pub(crate) fn arm<F>(&mut self, duration: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();

        let generation = self.generation;
        let handle = tokio::spawn(async move {
            sleep(duration).await;
            fire(generation);
        });
        self.handle = Some(handle);

        generation
    }

    /// Guarantee that no schedule existing at call time can still fire as
    /// current: the generation is bumped first, then the task is aborted.
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether `generation` refers to the most recently armed, still-pending
    /// schedule. Stale fire callbacks use this to recognize they have been
    /// superseded.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }
}

impl Drop for SilenceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
