//! Per-request timing accumulation.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Accumulates named wall-clock durations for a single request.
///
/// Clones share one underlying store, so nested and detached operations
/// measured within the same request sum into the same labels; a recorder
/// is created at request start and discarded with the request, so
/// measurements never leak between requests. Repeated labels accumulate
/// rather than overwrite.
#[derive(Debug, Clone)]
pub struct TimingRecorder {
    inner: Arc<Mutex<Timings>>,
}

#[derive(Debug)]
struct Timings {
    start: Instant,
    // Label -> accumulated milliseconds, in first-recorded order.
    entries: Vec<(String, f64)>,
}

impl TimingRecorder {
    /// Create a recorder; marks the start of the request.
    pub fn start() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Timings {
                start: Instant::now(),
                entries: Vec::new(),
            })),
        }
    }

    /// Measure an operation and add its duration under `label`.
    ///
    /// The measurement spans suspension points: elapsed wall-clock time is
    /// taken from just before the future is polled to just after it
    /// completes.
    pub async fn measure<T, F>(&self, label: &str, op: F) -> T
    where
        F: Future<Output = T>,
    {
        let begin = Instant::now();
        let out = op.await;
        self.record(label, begin.elapsed());
        out
    }

    /// Add a duration under `label`, summing with any previous value.
    pub fn record(&self, label: &str, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        let mut inner = self.lock();
        match inner.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, total)) => *total += ms,
            None => inner.entries.push((label.to_string(), ms)),
        }
    }

    /// Milliseconds elapsed since the recorder was created.
    pub fn total_ms(&self) -> f64 {
        self.lock().start.elapsed().as_secs_f64() * 1000.0
    }

    /// Accumulated entries in first-recorded order.
    pub fn entries(&self) -> Vec<(String, f64)> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timings> {
        // A poisoned lock only means another measurement panicked; the
        // accumulated numbers are still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
