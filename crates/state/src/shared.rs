//! State shared by all emitters of a run.

use crate::csv_table::CsvTable;
use crate::execution::Execution;
use dashmap::DashMap;
use datagen_random::RandomSource;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Cross-record state of a run.
///
/// Counters and lists are global sequences unless the template author
/// namespaces them. Each family lives in its own concurrent map so a
/// counter update never blocks a list append.
#[derive(Debug)]
pub struct GenerationState {
    execution: Execution,
    counters: DashMap<String, i64>,
    lists: DashMap<String, Vec<String>>,
    persisted: DashMap<String, String>,
    csv: RwLock<Arc<CsvTable>>,
    random: RandomSource,
}

impl GenerationState {
    pub fn new(random: RandomSource) -> Self {
        Self {
            execution: Execution::new(),
            counters: DashMap::new(),
            lists: DashMap::new(),
            persisted: DashMap::new(),
            csv: RwLock::new(Arc::new(CsvTable::default())),
            random,
        }
    }

    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    pub fn random(&self) -> &RandomSource {
        &self.random
    }

    /// Returns `start` on the first call for `name`, then the previous value
    /// plus `step`, wrapping around at the ends of the `i64` range.
    pub fn counter(&self, name: &str, start: i64, step: i64) -> i64 {
        let entry = self
            .counters
            .entry(name.to_string())
            .and_modify(|value| *value = value.wrapping_add(step))
            .or_insert(start);
        *entry
    }

    pub fn add_value_to_list(&self, name: &str, value: impl Into<String>) {
        self.lists
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    pub fn list_len(&self, name: &str) -> usize {
        self.lists.get(name).map_or(0, |list| list.len())
    }

    /// Uniform draw from the list's contents at call time, with the index
    /// that was drawn.
    pub fn random_value_from_list(&self, name: &str) -> Option<(usize, String)> {
        let list = self.lists.get(name)?;
        if list.is_empty() {
            return None;
        }
        let index = self.random.int_n(list.len());
        Some((index, list[index].clone()))
    }

    /// `n` values from `n` distinct positions of the list (`n` is capped at
    /// the list length).
    pub fn random_n_values_from_list(&self, name: &str, n: usize) -> Vec<String> {
        let Some(list) = self.lists.get(name) else {
            return Vec::new();
        };
        distinct_indices(&self.random, n, list.len())
            .into_iter()
            .map(|index| list[index].clone())
            .collect()
    }

    pub fn value_from_list_at_index(&self, name: &str, index: usize) -> Option<String> {
        self.lists.get(name)?.get(index).cloned()
    }

    /// Replace the CSV table.
    pub fn set_csv(&self, table: CsvTable) {
        debug!("Loaded CSV context with {} rows", table.len());
        let mut csv = self.csv.write().unwrap_or_else(|e| e.into_inner());
        *csv = Arc::new(table);
    }

    /// A throwaway state sharing this one's CSV table and persisted values,
    /// with its own counters, lists and an unseeded source. Rendering
    /// against it leaves this state untouched.
    pub fn scratch(&self) -> GenerationState {
        let scratch = GenerationState::new(RandomSource::unseeded());
        let csv = Arc::clone(&self.csv.read().unwrap_or_else(|e| e.into_inner()));
        *scratch.csv.write().unwrap_or_else(|e| e.into_inner()) = csv;
        for entry in self.persisted.iter() {
            scratch
                .persisted
                .insert(entry.key().clone(), entry.value().clone());
        }
        scratch
    }

    /// Value of `column` for the current iteration index.
    pub fn from_csv(&self, column: &str) -> Option<String> {
        self.from_csv_at(self.execution.current_iteration(), column)
    }

    /// Value of `column` in row `iteration % rows`.
    pub fn from_csv_at(&self, iteration: u64, column: &str) -> Option<String> {
        let table = Arc::clone(&self.csv.read().unwrap_or_else(|e| e.into_inner()));
        table.value(iteration, column).map(str::to_string)
    }

    /// Persist a value across records.
    pub fn set_value(&self, key: &str, value: impl Into<String>) {
        self.persisted.insert(key.to_string(), value.into());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.persisted.get(key).map(|v| v.value().clone())
    }
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::new(RandomSource::unseeded())
    }
}

/// `min(n, len)` distinct indices in `[0, len)` via a partial Fisher-Yates
/// shuffle.
fn distinct_indices(random: &RandomSource, n: usize, len: usize) -> Vec<usize> {
    let n = n.min(len);
    let mut pool: Vec<usize> = (0..len).collect();
    for i in 0..n {
        let j = i + random.int_n(len - i);
        pool.swap(i, j);
    }
    pool.truncate(n);
    pool
}
