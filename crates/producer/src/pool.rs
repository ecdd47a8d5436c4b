//! Run-scoped plugin resolution and teardown.

use crate::error::ProducerError;
use crate::local::LocalRegistry;
use crate::producer::Producer;
use crate::remote::{PluginCommand, RemoteProducer};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub const PLUGIN_CONFIG_SUFFIX: &str = ".conf.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Local,
    Remote,
}

/// A resolved output: its name, the producer behind it and where it runs.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    producer: Arc<dyn Producer>,
    kind: PluginKind,
}

impl Plugin {
    pub fn new(name: impl Into<String>, producer: Arc<dyn Producer>, kind: PluginKind) -> Self {
        Self {
            name: name.into(),
            producer,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn producer(&self) -> &Arc<dyn Producer> {
        &self.producer
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    pub fn is_local(&self) -> bool {
        self.kind == PluginKind::Local
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Outcome of closing every plugin of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    pub closed: usize,
    pub failed: usize,
}

/// Plugins opened during one run, one per output name.
///
/// Concurrent resolutions of the same new name share one initialization,
/// so a plugin process is spawned at most once per run.
pub struct PluginPool {
    registry: Arc<LocalRegistry>,
    plugin_dirs: Vec<PathBuf>,
    plugins: DashMap<String, Arc<OnceCell<Plugin>>>,
    closed: AtomicBool,
}

impl PluginPool {
    /// Pool over the global local registry. `plugin_dirs` are searched in
    /// order for plugin configuration files.
    pub fn new(plugin_dirs: Vec<PathBuf>) -> Self {
        Self::with_registry(LocalRegistry::global(), plugin_dirs)
    }

    pub fn with_registry(registry: Arc<LocalRegistry>, plugin_dirs: Vec<PathBuf>) -> Self {
        Self {
            registry,
            plugin_dirs,
            plugins: DashMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// The plugin for `output`, opening it on first use.
    pub async fn resolve(&self, output: &str) -> Result<Plugin, ProducerError> {
        let cell = self
            .plugins
            .entry(output.to_string())
            .or_default()
            .value()
            .clone();
        let plugin = cell.get_or_try_init(|| self.open(output)).await?;
        Ok(plugin.clone())
    }

    async fn open(&self, output: &str) -> Result<Plugin, ProducerError> {
        if let Some(producer) = self.registry.create(output) {
            debug!("Output '{}' resolved to a local producer", output);
            return Ok(Plugin::new(output, producer, PluginKind::Local));
        }

        let config = find_plugin_config(&plugin_name(output), &self.plugin_dirs);
        if let Some(config) = &config {
            debug!(
                "Using plugin configuration {} for '{}'",
                config.display(),
                output
            );
        }
        let command = PluginCommand::new(output, output).with_config(config);
        let producer = RemoteProducer::launch(&command).await?;
        info!("Plugin '{}' started", output);
        Ok(Plugin::new(output, Arc::new(producer), PluginKind::Remote))
    }

    /// Names of the plugins opened so far.
    pub fn opened(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .plugins
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Close every opened plugin once. Failures are logged, not returned;
    /// later calls do nothing.
    pub async fn close_all(&self) -> CloseSummary {
        let mut summary = CloseSummary::default();
        if self.closed.swap(true, Ordering::SeqCst) {
            return summary;
        }

        let plugins: Vec<Plugin> = self
            .plugins
            .iter()
            .filter_map(|entry| entry.value().get().cloned())
            .collect();
        self.plugins.clear();

        for plugin in plugins {
            match plugin.producer().close().await {
                Ok(()) => {
                    debug!("Closed plugin '{}'", plugin.name());
                    summary.closed += 1;
                }
                Err(e) => {
                    error!("Failed to close plugin '{}': {}", plugin.name(), e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Name used for a plugin's configuration file: the file name of its
/// command, so `/opt/bin/jr-kafka` reads `jr-kafka.conf.json`.
fn plugin_name(output: &str) -> String {
    Path::new(output)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(output)
        .to_string()
}

/// First `<dir>/<name>.conf.json` that exists.
pub fn find_plugin_config(name: &str, plugin_dirs: &[PathBuf]) -> Option<PathBuf> {
    plugin_dirs
        .iter()
        .map(|dir| dir.join(format!("{name}{PLUGIN_CONFIG_SUFFIX}")))
        .find(|path| path.is_file())
}
