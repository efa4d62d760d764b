// crates/interceptor/src/timer.rs
//! Cancellable one-shot timer used to schedule throttle wake-ups

use tokio::task::JoinHandle;

/// A deferred one-shot wake-up.
///
/// Arming replaces any pending wake-up: the previous task is aborted and
/// the generation counter is bumped. A fire that slips past the abort
/// carries a stale generation and is ignored by the owner.
pub(crate) struct DeferredTimer {
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl DeferredTimer {
    pub(crate) fn new() -> Self {
        Self {
            task: None,
            generation: 0,
        }
    }

    /// Invalidates any pending wake-up and returns the generation the
    /// next one must carry.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.stop();
        self.generation
    }

    /// Records the task backing the armed wake-up.
    pub(crate) fn set_task(&mut self, task: JoinHandle<()>) {
        self.task = Some(task);
    }

    /// True if `generation` identifies the currently armed wake-up.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && self.generation == generation
    }

    /// Cancels the pending wake-up, if any.
    pub(crate) fn stop(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DeferredTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
