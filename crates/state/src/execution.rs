//! Aggregate counters for a run.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Run-wide counters, updated once per produced record.
#[derive(Debug)]
pub struct Execution {
    started_at: DateTime<Utc>,
    started: Instant,
    generated_objects: AtomicU64,
    generated_bytes: AtomicU64,
    current_iteration: AtomicU64,
}

/// Point-in-time copy of [`Execution`] for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSnapshot {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub generated_objects: u64,
    pub generated_bytes: u64,
    pub current_iteration: u64,
}

impl ExecutionSnapshot {
    /// Objects per second since the run started.
    pub fn objects_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.generated_objects as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Execution {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            generated_objects: AtomicU64::new(0),
            generated_bytes: AtomicU64::new(0),
            current_iteration: AtomicU64::new(0),
        }
    }

    /// Advance the iteration index, returning the index of the record about
    /// to be rendered. The first record of a run gets index 0.
    pub fn advance_iteration(&self) -> u64 {
        self.current_iteration.fetch_add(1, Ordering::SeqCst)
    }

    /// Index the next record will get.
    pub fn current_iteration(&self) -> u64 {
        self.current_iteration.load(Ordering::SeqCst)
    }

    /// Count one successfully produced record of `bytes` bytes, as reported
    /// by the producer.
    pub fn record_emission(&self, bytes: u64) {
        self.generated_objects.fetch_add(1, Ordering::Relaxed);
        self.generated_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn generated_objects(&self) -> u64 {
        self.generated_objects.load(Ordering::Relaxed)
    }

    pub fn generated_bytes(&self) -> u64 {
        self.generated_bytes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
            generated_objects: self.generated_objects(),
            generated_bytes: self.generated_bytes(),
            current_iteration: self.current_iteration(),
        }
    }
}

impl Default for Execution {
    fn default() -> Self {
        Self::new()
    }
}
