//! Stress helpers for concurrent access.
//!
//! Each worker thread opens its own connection on a shared engine, which is
//! the only supported way to use the binding from several threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use ydb_core::{Conn, Key};
use ydb_ffi::InMemoryEngine;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Operations whose result matched what was written.
    pub successful_ops: usize,
    /// Failed or mismatched operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Operations per second over the run.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_ops as f64 / secs
        } else {
            0.0
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Set/get pairs per thread.
    pub operations_per_thread: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            operations_per_thread: 1000,
        }
    }
}

/// Runs set-then-get pairs from several threads.
///
/// Every thread writes under its own subscript of `^stress` and also reads
/// through one [`Key`] that all threads share, bound to each thread's
/// connection.
pub fn run_concurrent_set_get(
    engine: Arc<InMemoryEngine>,
    config: &StressConfig,
) -> StressTestResult {
    let successes = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let shared = Key::new("^stress", &["shared"]);
    let start = Instant::now();

    {
        let setup = Conn::new(engine.clone());
        shared.bind(&setup).set("shared").expect("seeding the shared key");
    }

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let engine = engine.clone();
            let shared = shared.clone();
            let successes = successes.clone();
            let failures = failures.clone();
            let ops = config.operations_per_thread;
            thread::spawn(move || {
                let conn = Conn::new(engine);
                let tag = t.to_string();
                let shared = shared.bind(&conn);
                for i in 0..ops {
                    let index = i.to_string();
                    let n = conn.node("^stress", &[tag.as_str(), index.as_str()]);
                    let value = format!("{t}:{i}");
                    let ok = n.set(&value).is_ok()
                        && n.get().ok().as_deref() == Some(value.as_str())
                        && shared.get().ok().as_deref() == Some("shared");
                    if ok {
                        successes.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("stress worker panicked");
    }

    let successful_ops = successes.load(Ordering::Relaxed);
    let failed_ops = failures.load(Ordering::Relaxed);
    StressTestResult {
        total_ops: successful_ops + failed_ops,
        successful_ops,
        failed_ops,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_set_get_small() {
        let engine = Arc::new(InMemoryEngine::new());
        let config = StressConfig {
            threads: 4,
            operations_per_thread: 50,
        };
        let result = run_concurrent_set_get(engine.clone(), &config);
        assert_eq!(result.total_ops, 200);
        assert_eq!(result.failed_ops, 0);
        // 200 per-thread nodes plus the shared one.
        assert_eq!(engine.len(), 201);
    }
}
