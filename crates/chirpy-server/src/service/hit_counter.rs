//! Fileserver hit counter shown on the admin metrics page.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter of fileserver requests, shared across handlers.
#[derive(Debug, Default, Clone)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one hit and returns the new total.
    #[inline]
    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the current total.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Resets the total to zero.
    #[inline]
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_counted() -> anyhow::Result<()> {
        let counter = HitCounter::new();
        let tasks = (0..8)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        counter.increment();
                    }
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await?;
        }

        assert_eq!(counter.hits(), 800);
        counter.reset();
        assert_eq!(counter.hits(), 0);
        Ok(())
    }
}
