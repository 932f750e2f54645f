//! Progress reporting for batch generation.

use crate::batch::BatchResult;

/// Progress callback for observing a batch run.
///
/// Notified after each item completes, in order, before the next item
/// begins; `item_started` additionally carries the error currently being
/// processed so callers can render a live progress line.
pub trait ProgressReporter: Send + Sync {
    /// Called once after the error list has been resolved.
    fn batch_started(&self, total: usize);
    /// Called before the generation call for one item.
    fn item_started(&self, current: usize, total: usize, error: &str);
    /// Called after one item completes (success or failure).
    fn item_finished(&self, current: usize, total: usize, error: &str, ok: bool);
    /// Called when the batch returns (including early return on cancel).
    fn done(&self, result: &BatchResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn batch_started(&self, _total: usize) {}
    fn item_started(&self, _current: usize, _total: usize, _error: &str) {}
    fn item_finished(&self, _current: usize, _total: usize, _error: &str, _ok: bool) {}
    fn done(&self, _result: &BatchResult) {}
}
