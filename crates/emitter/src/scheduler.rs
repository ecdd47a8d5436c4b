//! Runs a set of emitters concurrently and tears the run down.

use crate::config::EmitterConfig;
use crate::emitter::Emitter;
use crate::error::SchedulerError;
use crate::report::RunReport;
use datagen_producer::PluginPool;
use datagen_state::GenerationState;
use datagen_template::DataDirs;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Owns the shared state and plugin pool of one run.
pub struct Scheduler {
    shared: Arc<GenerationState>,
    pool: Arc<PluginPool>,
    dirs: DataDirs,
    allow_partial: bool,
}

impl Scheduler {
    pub fn new(shared: Arc<GenerationState>, pool: Arc<PluginPool>, dirs: DataDirs) -> Self {
        Self {
            shared,
            pool,
            dirs,
            allow_partial: false,
        }
    }

    /// Start the emitters that prepared fine even when others failed.
    /// Off by default: any startup failure aborts the run.
    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    pub fn shared(&self) -> &Arc<GenerationState> {
        &self.shared
    }

    pub fn pool(&self) -> &Arc<PluginPool> {
        &self.pool
    }

    /// Prepare every emitter, run them until they stop or `cancel` fires,
    /// then close every plugin of the run.
    ///
    /// Startup failures are returned before any emitter ticks.
    pub async fn run(
        &self,
        configs: Vec<EmitterConfig>,
        cancel: CancellationToken,
    ) -> Result<RunReport, SchedulerError> {
        let mut emitters = Vec::with_capacity(configs.len());
        let mut failures = Vec::new();
        for config in configs {
            let name = config.name.clone();
            match Emitter::prepare(config, &self.dirs, &self.pool, &self.shared).await {
                Ok(emitter) => emitters.push(emitter),
                Err(e) => {
                    error!("Emitter '{}' failed to start: {}", name, e);
                    failures.push(e);
                }
            }
        }

        if !failures.is_empty() && (!self.allow_partial || emitters.is_empty()) {
            drop(emitters);
            self.pool.close_all().await;
            return Err(SchedulerError::Startup(failures));
        }
        for failure in &failures {
            warn!("Running without emitter '{}'", failure.emitter());
        }

        info!("Starting {} emitter(s)", emitters.len());
        let mut tasks = JoinSet::new();
        for emitter in emitters {
            let shared = self.shared.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { emitter.run(shared, cancel).await });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    debug!("Emitter '{}' finished", report.name);
                    reports.push(report);
                }
                Err(e) => error!("Emitter task failed: {}", e),
            }
        }
        reports.sort_by(|a, b| a.name.cmp(&b.name));

        let plugins = self.pool.close_all().await;
        Ok(RunReport {
            emitters: reports,
            execution: self.shared.execution().snapshot(),
            plugins,
        })
    }
}

/// A token cancelled on Ctrl-C.
///
/// The listener task ends when the token is cancelled, so callers cancel it
/// once the run is over.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let interrupted = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Interrupted, stopping emitters");
                    interrupted.cancel();
                }
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            },
            _ = interrupted.cancelled() => {}
        }
    });
    token
}
