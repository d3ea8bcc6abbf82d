/*!
 * Progress and abort channel between a translation run and its caller.
 *
 * Both sides only ever touch atomics: the run increments the counter and
 * polls the abort flag, the caller polls the counter and sets the flag.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cooperative cancellation flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running job to stop at its next checkpoint
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag before a new run
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Monotonic count of completed pages. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter(Arc<AtomicUsize>);

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new value
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Handles a caller passes into a run
#[derive(Debug, Clone, Default)]
pub struct TranslationControl {
    pub progress: ProgressCounter,
    pub abort: AbortSignal,
}

impl TranslationControl {
    pub fn new() -> Self {
        Self::default()
    }
}
