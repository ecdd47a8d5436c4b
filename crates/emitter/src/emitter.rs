//! One emitter: compiled templates, a resolved plugin and its tick loop.

use crate::config::EmitterConfig;
use crate::error::{EmitterError, RecordError};
use crate::report::EmitterReport;
use crate::throughput::calculate_frequency;
use datagen_producer::{Plugin, PluginPool};
use datagen_state::{GenerationState, RecordState};
use datagen_template::{DataDirs, RenderContext, Template, TemplateSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How the emitter's loop fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Every period until stopped.
    Periodic(Duration),
    /// Back to back until stopped.
    Continuous,
    /// One tick, then stop.
    SingleShot,
}

struct Templates {
    key: Template,
    value: Template,
    header: Option<Template>,
    output: Template,
}

/// A rendered record before it is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRecord {
    pub key: String,
    pub value: String,
    pub headers: HashMap<String, String>,
    /// Output template result; the bytes handed to the producer.
    pub output: String,
}

/// An emitter ready to run.
pub struct Emitter {
    config: Arc<EmitterConfig>,
    templates: Templates,
    plugin: Plugin,
    mode: TickMode,
}

impl Emitter {
    /// Compile templates, resolve the output and settle the tick mode.
    pub async fn prepare(
        config: EmitterConfig,
        dirs: &DataDirs,
        pool: &PluginPool,
        shared: &GenerationState,
    ) -> Result<Self, EmitterError> {
        let name = config.name.clone();
        if config.tick.num == 0 {
            return Err(EmitterError::Invalid {
                emitter: name,
                message: "num must be at least 1".to_string(),
            });
        }

        let compile = |field: &'static str, source: &TemplateSource| {
            source
                .compile(field, dirs)
                .map_err(|source| EmitterError::Template {
                    emitter: name.clone(),
                    field,
                    source,
                })
        };
        let templates = Templates {
            key: compile("key", &config.key)?,
            value: compile("value", &config.value)?,
            header: config
                .header
                .as_ref()
                .map(|source| compile("header", source))
                .transpose()?,
            output: compile("output", &config.output_template)?,
        };

        let plugin = pool
            .resolve(&config.output)
            .await
            .map_err(|source| EmitterError::Output {
                emitter: name.clone(),
                output: config.output.clone(),
                source,
            })?;

        let mut emitter = Self {
            config: Arc::new(config),
            templates,
            plugin,
            mode: TickMode::SingleShot,
        };
        emitter.mode = emitter.tick_mode(shared)?;
        debug!(
            "Emitter '{}' prepared: output '{}', mode {:?}",
            emitter.name(),
            emitter.plugin.name(),
            emitter.mode
        );
        Ok(emitter)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn mode(&self) -> TickMode {
        self.mode
    }

    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    /// A metered throughput sets the period from the size of one sample
    /// record, rendered against scratch state so no counter or list moves.
    fn tick_mode(&self, shared: &GenerationState) -> Result<TickMode, EmitterError> {
        let tick = &self.config.tick;
        let mode = if tick.throughput.is_metered() {
            let scratch = shared.scratch();
            let bytes = self
                .render(&scratch, 0)
                .map_err(|e| EmitterError::Invalid {
                    emitter: self.name().to_string(),
                    message: format!(
                        "could not render a sample record to size throughput {}: {}",
                        tick.throughput, e
                    ),
                })?
                .output
                .len();
            let frequency = calculate_frequency(bytes, tick.num, tick.throughput);
            info!(
                "Emitter '{}': {} byte records at {} give a period of {:?}",
                self.name(),
                bytes,
                tick.throughput,
                frequency
            );
            if frequency.is_zero() {
                TickMode::Continuous
            } else {
                TickMode::Periodic(frequency)
            }
        } else if tick.frequency.is_zero() {
            TickMode::SingleShot
        } else {
            TickMode::Periodic(tick.frequency)
        };
        Ok(mode)
    }

    /// Render one record with fresh record state.
    pub fn render(
        &self,
        shared: &GenerationState,
        iteration: u64,
    ) -> Result<RenderedRecord, RecordError> {
        let mut record = RecordState::new(iteration, self.config.locale.as_str());
        let no_data = HashMap::new();

        let mut ctx = RenderContext::new(shared, &mut record, &no_data);
        let key = self.templates.key.render(&mut ctx)?;
        let mut value = self.templates.value.render(&mut ctx)?;
        if self.config.oneline {
            value = value.replace(&['\n', '\r'][..], "");
        }
        let header_text = match &self.templates.header {
            Some(header) => header.render(&mut ctx)?,
            None => String::new(),
        };
        let headers = parse_headers(&header_text)?;

        let data = HashMap::from([
            ("K".to_string(), key.clone()),
            ("V".to_string(), value.clone()),
            ("H".to_string(), header_text),
        ]);
        let mut ctx = RenderContext::new(shared, &mut record, &data);
        let output = self.templates.output.render(&mut ctx)?;

        Ok(RenderedRecord {
            key,
            value,
            headers,
            output,
        })
    }

    /// Render and produce one record, returning the bytes the producer wrote.
    pub async fn emit_record(&self, shared: &GenerationState) -> Result<u64, RecordError> {
        let iteration = shared.execution().advance_iteration();
        let record = self.render(shared, iteration)?;
        let response = self
            .plugin
            .producer()
            .produce(
                record.key.as_bytes(),
                record.output.as_bytes(),
                &record.headers,
                &self.config.config_params,
            )
            .await?;
        shared.execution().record_emission(response.bytes_written);
        Ok(response.bytes_written)
    }

    /// Emit up to `count` records, stopping early once `stop` is cancelled.
    async fn emit_batch(
        &self,
        count: usize,
        shared: &GenerationState,
        stop: &CancellationToken,
        report: &mut EmitterReport,
    ) {
        for _ in 0..count {
            if stop.is_cancelled() {
                return;
            }
            match self.emit_record(shared).await {
                Ok(bytes) => report.record_success(bytes),
                Err(e) => {
                    warn!(
                        "Emitter '{}' (output '{}'): record failed: {}",
                        self.name(),
                        self.plugin.name(),
                        e
                    );
                    report.record_failure();
                }
            }
        }
    }

    /// Run until the tick mode ends, the duration elapses or `cancel` fires.
    pub async fn run(
        self,
        shared: Arc<GenerationState>,
        cancel: CancellationToken,
    ) -> EmitterReport {
        let mut report = EmitterReport::new(self.name());
        let stop = cancel.child_token();
        let tick = self.config.tick.clone();

        if let (Some(duration), TickMode::Periodic(_) | TickMode::Continuous) =
            (tick.duration, self.mode)
        {
            let stop = stop.clone();
            let name = self.name().to_string();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {
                        debug!("Emitter '{}': duration {:?} elapsed", name, duration);
                        stop.cancel();
                    }
                    _ = stop.cancelled() => {}
                }
            });
        }

        if self.config.preload > 0 {
            debug!(
                "Emitter '{}': preloading {} records",
                self.name(),
                self.config.preload
            );
            self.emit_batch(self.config.preload, &shared, &stop, &mut report)
                .await;
        }

        match self.mode {
            TickMode::SingleShot => {
                self.emit_batch(tick.num, &shared, &stop, &mut report).await;
                report.ticks += 1;
            }
            TickMode::Continuous => {
                while !stop.is_cancelled() {
                    self.emit_batch(tick.num, &shared, &stop, &mut report).await;
                    report.ticks += 1;
                    tokio::task::yield_now().await;
                }
            }
            TickMode::Periodic(period) => {
                let mut ticker = if tick.immediate_start {
                    interval(period)
                } else {
                    interval_at(Instant::now() + period, period)
                };
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => break,
                        _ = ticker.tick() => {
                            self.emit_batch(tick.num, &shared, &stop, &mut report).await;
                            report.ticks += 1;
                        }
                    }
                }
            }
        }

        stop.cancel();
        debug!(
            "Emitter '{}' stopped after {} ticks",
            self.name(),
            report.ticks
        );
        report
    }
}

/// Headers from the rendered header template: a JSON object of strings,
/// or nothing when the text is empty or `null`.
fn parse_headers(text: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    let text = text.trim();
    if text.is_empty() || text == "null" {
        return Ok(HashMap::new());
    }
    serde_json::from_str(text)
}
