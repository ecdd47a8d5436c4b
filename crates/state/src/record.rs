//! Per-record scratch state.

use std::collections::HashMap;

/// State visible to every function call while one record renders.
///
/// Generator functions write here (`city` sets the city index, `name`
/// stashes `_name`) and later functions of the same record read it back
/// (`zip`, `email`). The scheduler creates a new one per record.
#[derive(Debug, Clone, Default)]
pub struct RecordState {
    iteration: u64,
    locale: String,
    /// Index picked by the last list-based draw.
    pub last_index: Option<usize>,
    /// Index of the last country chosen in this record.
    pub country_index: Option<usize>,
    /// Index of the last city chosen in this record.
    pub city_index: Option<usize>,
    stash: HashMap<String, String>,
}

impl RecordState {
    pub fn new(iteration: u64, locale: impl Into<String>) -> Self {
        Self {
            iteration,
            locale: locale.into(),
            ..Default::default()
        }
    }

    /// Iteration index this record was rendered for.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Stash a value for later fields of this record (`_name`, `_city`, ...).
    pub fn stash(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.stash.insert(key.into(), value.into());
    }

    pub fn stashed(&self, key: &str) -> Option<&str> {
        self.stash.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_clean() {
        let mut record = RecordState::new(0, "us");
        record.city_index = Some(3);
        record.stash("_city", "Boston");

        let next = RecordState::new(1, "us");
        assert_eq!(next.city_index, None);
        assert_eq!(next.stashed("_city"), None);
        assert_eq!(next.iteration(), 1);
        assert_eq!(record.stashed("_city"), Some("Boston"));
    }
}
