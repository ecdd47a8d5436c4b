//! Per-emitter and per-run statistics.

use datagen_producer::CloseSummary;
use datagen_state::ExecutionSnapshot;
use tracing::info;

/// What one emitter did during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitterReport {
    pub name: String,
    pub produced: u64,
    pub failed: u64,
    pub bytes: u64,
    pub ticks: u64,
}

impl EmitterReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.produced += 1;
        self.bytes += bytes;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub emitters: Vec<EmitterReport>,
    pub execution: ExecutionSnapshot,
    pub plugins: CloseSummary,
}

impl RunReport {
    pub fn produced(&self) -> u64 {
        self.emitters.iter().map(|e| e.produced).sum()
    }

    pub fn failed(&self) -> u64 {
        self.emitters.iter().map(|e| e.failed).sum()
    }

    pub fn emitter(&self, name: &str) -> Option<&EmitterReport> {
        self.emitters.iter().find(|e| e.name == name)
    }

    pub fn log(&self) {
        for emitter in &self.emitters {
            info!(
                "Emitter '{}': {} records produced ({} bytes), {} failed, {} ticks",
                emitter.name, emitter.produced, emitter.bytes, emitter.failed, emitter.ticks
            );
        }
        info!(
            "Run started at {}: {} objects, {} bytes in {:.2?} ({:.1} objects/s); {} plugin(s) closed, {} close failure(s)",
            self.execution.started_at.to_rfc3339(),
            self.execution.generated_objects,
            self.execution.generated_bytes,
            self.execution.elapsed,
            self.execution.objects_per_second(),
            self.plugins.closed,
            self.plugins.failed
        );
    }
}
