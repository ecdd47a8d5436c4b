//! In-process producers and the registry they are looked up in.

mod console;
mod file;

pub use console::ConsoleProducer;
pub use file::FileProducer;

use crate::producer::Producer;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// Builds a fresh instance of a local producer.
pub type LocalFactory = Arc<dyn Fn() -> Arc<dyn Producer> + Send + Sync>;

pub const STDOUT: &str = "stdout";
pub const FILE: &str = "file";

/// Local producers by output name.
pub struct LocalRegistry {
    factories: RwLock<BTreeMap<String, LocalFactory>>,
}

impl LocalRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(BTreeMap::new()),
        }
    }

    /// A registry holding the built-in `stdout` and `file` producers.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register(
            STDOUT,
            Arc::new(|| Arc::new(ConsoleProducer::stdout()) as Arc<dyn Producer>),
        );
        registry.register(
            FILE,
            Arc::new(|| Arc::new(FileProducer::new()) as Arc<dyn Producer>),
        );
        registry
    }

    /// The process-wide registry, created with the built-ins on first use.
    pub fn global() -> Arc<LocalRegistry> {
        static GLOBAL: OnceLock<Arc<LocalRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(LocalRegistry::with_builtins()))
            .clone()
    }

    /// Register (or replace) a local producer.
    pub fn register(&self, name: &str, factory: LocalFactory) {
        debug!("Registering local producer '{}'", name);
        self.factories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// New instance of the named producer, if registered.
    pub fn create(&self, name: &str) -> Option<Arc<dyn Producer>> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()?;
        Some(factory())
    }

    pub fn names(&self) -> Vec<String> {
        self.factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for LocalRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
