//! Wiring for one run: shared state, plugin pool and scheduler.

use anyhow::Context;
use datagen_emitter::{EmitterConfig, RunReport, Scheduler};
use datagen_producer::{LocalRegistry, PluginPool};
use datagen_random::RandomSource;
use datagen_state::{CsvTable, GenerationState};
use datagen_template::DataDirs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run-wide settings that are not per emitter.
#[derive(Clone)]
pub struct RunOptions {
    pub random: RandomSource,
    pub csv: Option<PathBuf>,
    pub allow_partial: bool,
    pub dirs: DataDirs,
    pub registry: Arc<LocalRegistry>,
}

impl RunOptions {
    pub fn new(random: RandomSource, dirs: DataDirs) -> Self {
        Self {
            random,
            csv: None,
            allow_partial: false,
            dirs,
            registry: LocalRegistry::global(),
        }
    }
}

/// Run `emitters` until they finish or `cancel` fires.
pub async fn execute(
    emitters: Vec<EmitterConfig>,
    options: RunOptions,
    cancel: CancellationToken,
) -> anyhow::Result<RunReport> {
    // Stops the interrupt listener once the run is over, however it ends.
    let _stop = cancel.clone().drop_guard();
    let shared = Arc::new(GenerationState::new(options.random));
    if let Some(path) = &options.csv {
        let table = CsvTable::from_path(path)
            .with_context(|| format!("Failed to load CSV file {path:?}"))?;
        shared.set_csv(table);
    }

    let pool = PluginPool::with_registry(options.registry, options.dirs.plugins_dirs().to_vec());
    let scheduler = Scheduler::new(shared, Arc::new(pool), options.dirs)
        .allow_partial(options.allow_partial);

    info!("Running {} emitter(s)", emitters.len());
    let report = scheduler.run(emitters, cancel).await?;
    report.log();
    Ok(report)
}
