use std::future::Future;

use tokio::sync::Semaphore;

// Caps how many detail-page fetches run at once. Permits are FIFO, so queued
// tasks start in submission order once capacity frees.
pub struct Limiter {
    permits: Semaphore,
}

impl Limiter {
    pub fn new(bound: usize) -> Self {
        Limiter {
            permits: Semaphore::new(bound),
        }
    }

    pub async fn run<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        // The semaphore is never closed, so acquire only waits, never fails.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("limiter semaphore closed");
        task.await
    }
}
