//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Progress/cancellation collaborator polled by the matcher.
///
/// Methods take `&self` so a host thread can cancel while a run is active.
pub trait Progress {
    fn is_canceled(&self) -> bool;

    /// Sets the fraction of total work one step represents.
    fn set_progress_step_size(&self, step: f64);

    /// Marks one step as done.
    fn progress_step_done(&self);

    /// Clears progress back to zero.
    fn reset_progress(&self);
}

/// Progress sink that never cancels and records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn is_canceled(&self) -> bool {
        false
    }

    fn set_progress_step_size(&self, _step: f64) {}

    fn progress_step_done(&self) {}

    fn reset_progress(&self) {}
}

/// Atomic progress counter with a cancel flag, shareable across threads.
#[derive(Debug, Default)]
pub struct ProgressControl {
    canceled: AtomicBool,
    step_bits: AtomicU64,
    progress_bits: AtomicU64,
}

impl ProgressControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the running job.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Clears a previous cancel request.
    pub fn clear_cancel(&self) {
        self.canceled.store(false, Ordering::Release);
    }

    /// Completed fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress_bits.load(Ordering::Acquire)).min(1.0)
    }
}

impl Progress for ProgressControl {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    fn set_progress_step_size(&self, step: f64) {
        self.step_bits.store(step.to_bits(), Ordering::Release);
    }

    fn progress_step_done(&self) {
        let step = f64::from_bits(self.step_bits.load(Ordering::Acquire));
        // Single writer; load + store is enough.
        let current = f64::from_bits(self.progress_bits.load(Ordering::Acquire));
        self.progress_bits
            .store((current + step).to_bits(), Ordering::Release);
    }

    fn reset_progress(&self) {
        self.progress_bits.store(0f64.to_bits(), Ordering::Release);
    }
}
