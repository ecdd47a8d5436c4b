//! Run configuration files.
//!
//! ```yaml
//! seed: 42
//! csv: ./users.csv
//! emitters:
//!   - name: users
//!     value: { named: user }
//!     num: 10
//!     frequency: 500ms
//!     duration: 1m
//!   - name: orders
//!     value: { inline: '{"id":"{{uuid}}"}' }
//!     output: file
//!     config_params: { outputDir: /tmp, fileName: orders.jsonl }
//! ```

use anyhow::Context;
use datagen_emitter::EmitterConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Everything one run needs besides the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Seed for reproducible runs; `-1` or absent runs unseeded.
    #[serde(default)]
    pub seed: Option<i64>,
    /// CSV file whose rows feed `fromcsv`.
    #[serde(default)]
    pub csv: Option<PathBuf>,
    /// Keep going when some emitters fail to start.
    #[serde(default)]
    pub allow_partial: bool,
    pub emitters: Vec<EmitterConfig>,
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {path:?}"))
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.emitters.is_empty() {
            anyhow::bail!("No emitters configured");
        }
        let mut names = HashSet::new();
        for emitter in &self.emitters {
            if !names.insert(emitter.name.as_str()) {
                anyhow::bail!("Duplicate emitter name '{}'", emitter.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_template::TemplateSource;
    use std::time::Duration;

    #[test]
    fn test_parse_run_config() {
        let config = RunConfig::from_yaml(
            r#"
seed: 7
csv: data.csv
emitters:
  - name: a
    value: { inline: "{{uuid}}" }
    frequency: 250ms
    duration: 2s
    throughput: 1KB/s
  - name: b
    value: { named: user }
    output: file
    config_params: { fileName: b.txt }
"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.csv, Some(PathBuf::from("data.csv")));
        assert!(!config.allow_partial);
        assert_eq!(config.emitters.len(), 2);

        let a = &config.emitters[0];
        assert_eq!(a.tick.frequency, Duration::from_millis(250));
        assert_eq!(a.tick.duration, Some(Duration::from_secs(2)));
        assert!(a.tick.throughput.is_metered());

        let b = &config.emitters[1];
        assert_eq!(b.value, TemplateSource::named("user"));
        assert_eq!(b.output, "file");
        assert_eq!(b.config_params["fileName"], "b.txt");
    }

    #[test]
    fn test_empty_emitters_rejected() {
        let err = RunConfig::from_yaml("emitters: []").unwrap_err();
        assert!(err.to_string().contains("No emitters"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = RunConfig::from_yaml(
            r#"
emitters:
  - { name: x, value: { inline: "1" } }
  - { name: x, value: { inline: "2" } }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate emitter name 'x'"));
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(RunConfig::from_yaml("emitters:\n  - name: x\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "emitters:\n  - value: { inline: hi }\n").unwrap();
        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.emitters[0].name, "cli");

        let missing = RunConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(format!("{missing:#}").contains("Failed to read config file"));
    }
}
