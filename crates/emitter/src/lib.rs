//! Emitters and the scheduler that drives them.
//!
//! An [`EmitterConfig`] describes one stream: templates, output, and a
//! [`Tick`] saying how many records to emit and how often. The
//! [`Scheduler`] prepares every emitter of a run (compiling templates and
//! resolving outputs through a shared [`PluginPool`]), reports all startup
//! failures at once, then runs one task per emitter. A single
//! [`CancellationToken`] stops them all; each ticking emitter also stops by
//! itself once its duration elapses. When every task has finished, every
//! plugin of the run is closed once.
//!
//! [`PluginPool`]: datagen_producer::PluginPool
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod config;
pub mod emitter;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod throughput;

pub use config::{EmitterConfig, Tick};
pub use emitter::{Emitter, RenderedRecord, TickMode};
pub use error::{EmitterError, RecordError, SchedulerError, ThroughputError};
pub use report::{EmitterReport, RunReport};
pub use scheduler::{interrupt_token, Scheduler};
pub use throughput::{calculate_frequency, parse_throughput, Throughput};
