use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer notified as records are confirmed.
///
/// Called concurrently from many extraction tasks.
pub trait ProgressSink: Send + Sync {
    fn on_increment(&self, n: usize);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_increment(&self, _n: usize) {}
}

/// Lock-free running total of confirmed records.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
    }
}

impl ProgressSink for ProgressCounter {
    fn on_increment(&self, n: usize) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let counter = Arc::new(ProgressCounter::new());

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    counter.on_increment(1);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.total(), 50);
    }

    #[test]
    fn test_reset() {
        let counter = ProgressCounter::new();
        counter.on_increment(3);
        assert_eq!(counter.total(), 3);
        counter.reset();
        assert_eq!(counter.total(), 0);
    }
}
