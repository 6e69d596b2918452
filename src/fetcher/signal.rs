use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "keep running" flag for one harvest batch.
///
/// Set means work may proceed; cleared means every fetch and fan-out must
/// return early at its next check. Unlike a one-shot token it can be set
/// again for the next batch. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct RunSignal {
    running: Arc<AtomicBool>,
}

impl RunSignal {
    /// Create a signal in the stopped state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal that is already running.
    pub fn started() -> Self {
        let signal = Self::new();
        signal.start();
        signal
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn is_stopped(&self) -> bool {
        !self.is_running()
    }
}
