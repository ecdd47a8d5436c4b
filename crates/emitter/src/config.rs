//! Emitter configuration as loaded from YAML or built from CLI flags.

use crate::throughput::Throughput;
use datagen_template::TemplateSource;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_NAME: &str = "cli";
pub const DEFAULT_LOCALE: &str = "us";
pub const DEFAULT_NUM: usize = 1;
pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(1);
pub const DEFAULT_OUTPUT: &str = "stdout";
pub const DEFAULT_KEY_TEMPLATE: &str = "null";
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "{{.V}}";

/// When and how much an emitter produces.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tick {
    /// Records per tick.
    #[serde(default = "default_num")]
    pub num: usize,
    /// Delay between ticks; zero emits one tick and stops.
    #[serde(default = "default_frequency", deserialize_with = "human_duration")]
    pub frequency: Duration,
    /// Run time of a ticking emitter; unbounded when absent.
    #[serde(default, deserialize_with = "human_duration_opt")]
    pub duration: Option<Duration>,
    /// Target byte rate; when metered it replaces `frequency`.
    #[serde(default)]
    pub throughput: Throughput,
    /// Fire the first tick right away instead of after one period.
    #[serde(default)]
    pub immediate_start: bool,
}

impl Default for Tick {
    fn default() -> Self {
        Self {
            num: DEFAULT_NUM,
            frequency: DEFAULT_FREQUENCY,
            duration: None,
            throughput: Throughput::UNMETERED,
            immediate_start: false,
        }
    }
}

/// One production stream. Never changes once its emitter starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmitterConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(flatten)]
    pub tick: Tick,
    /// Records emitted once before the first tick.
    #[serde(default)]
    pub preload: usize,
    #[serde(default = "default_key")]
    pub key: TemplateSource,
    pub value: TemplateSource,
    /// Renders a JSON object of string headers; no headers when absent.
    #[serde(default)]
    pub header: Option<TemplateSource>,
    /// Renders the bytes handed to the producer from `.K`, `.V` and `.H`.
    #[serde(default = "default_output_template")]
    pub output_template: TemplateSource,
    /// Local producer name or plugin command.
    #[serde(default = "default_output")]
    pub output: String,
    /// Strip newlines from the rendered value.
    #[serde(default)]
    pub oneline: bool,
    /// Passed to the producer untouched.
    #[serde(default)]
    pub config_params: HashMap<String, String>,
}

impl EmitterConfig {
    /// A config with every default and the given value template.
    pub fn new(name: impl Into<String>, value: TemplateSource) -> Self {
        Self {
            name: name.into(),
            locale: default_locale(),
            tick: Tick::default(),
            preload: 0,
            key: default_key(),
            value,
            header: None,
            output_template: default_output_template(),
            output: default_output(),
            oneline: false,
            config_params: HashMap::new(),
        }
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_num() -> usize {
    DEFAULT_NUM
}

fn default_frequency() -> Duration {
    DEFAULT_FREQUENCY
}

fn default_key() -> TemplateSource {
    TemplateSource::inline(DEFAULT_KEY_TEMPLATE)
}

fn default_output_template() -> TemplateSource {
    TemplateSource::inline(DEFAULT_OUTPUT_TEMPLATE)
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn human_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

fn human_duration_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => humantime::parse_duration(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
