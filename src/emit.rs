//! Command-line flags for a single ad-hoc emitter.

use clap::Args;
use datagen_emitter::config::{
    DEFAULT_LOCALE, DEFAULT_NAME, DEFAULT_OUTPUT, DEFAULT_OUTPUT_TEMPLATE,
};
use datagen_emitter::{parse_throughput, EmitterConfig, Throughput, Tick};
use datagen_template::TemplateSource;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Clone, Debug)]
pub struct EmitArgs {
    /// Value template text, or a template name with --named
    pub template: String,

    /// Treat the template argument as a named template from the templates dirs
    #[arg(long)]
    pub named: bool,

    /// Emitter name used in logs and reports
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Records per tick
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num: usize,

    /// Delay between ticks (e.g. "500ms", "2s"); 0 emits once and exits
    #[arg(short = 'f', long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub frequency: Duration,

    /// Stop after this long (e.g. "1m"); runs until interrupted when omitted
    #[arg(short = 'd', long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Target rate such as "200KB/s"; overrides --frequency
    #[arg(long, value_parser = parse_throughput)]
    pub throughput: Option<Throughput>,

    /// Fire the first tick immediately
    #[arg(long)]
    pub immediate_start: bool,

    /// Records emitted once before the first tick
    #[arg(long, default_value_t = 0)]
    pub preload: usize,

    /// Key template
    #[arg(short = 'k', long)]
    pub key: Option<String>,

    /// Header template rendering a JSON object of strings
    #[arg(long)]
    pub header: Option<String>,

    /// Output template combining .K, .V and .H
    #[arg(long, default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output_template: String,

    /// Local producer name or plugin command
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Locale for address and people functions
    #[arg(short = 'l', long, default_value = DEFAULT_LOCALE)]
    pub locale: String,

    /// Strip newlines from the rendered value
    #[arg(long)]
    pub oneline: bool,

    /// Producer parameter as KEY=VALUE; repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// CSV file whose rows feed `fromcsv`
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

impl EmitArgs {
    pub fn to_config(&self) -> EmitterConfig {
        let value = if self.named {
            TemplateSource::named(&self.template)
        } else {
            TemplateSource::inline(&self.template)
        };
        let mut config = EmitterConfig::new(&self.name, value);
        config.locale = self.locale.clone();
        config.tick = Tick {
            num: self.num,
            frequency: self.frequency,
            duration: self.duration,
            throughput: self.throughput.unwrap_or_default(),
            immediate_start: self.immediate_start,
        };
        config.preload = self.preload;
        if let Some(key) = &self.key {
            config.key = TemplateSource::inline(key);
        }
        config.header = self.header.as_deref().map(TemplateSource::inline);
        config.output_template = TemplateSource::inline(&self.output_template);
        config.output = self.output.clone();
        config.oneline = self.oneline;
        config.config_params = self.params.iter().cloned().collect::<HashMap<_, _>>();
        config
    }
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{input}'")),
    }
}
