//! Error types for emitters and the scheduler.

use datagen_producer::ProducerError;
use datagen_template::TemplateError;
use thiserror::Error;

/// A malformed throughput string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid throughput '{0}': expected <number><unit>/<s|m|h|d> with unit b, B, Kb, KB, Mb, MB, Gb, GB, Tb or TB")]
pub struct ThroughputError(pub String);

/// Why an emitter could not start.
#[derive(Error, Debug)]
pub enum EmitterError {
    #[error("emitter '{emitter}': {field} template: {source}")]
    Template {
        emitter: String,
        field: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("emitter '{emitter}': output '{output}': {source}")]
    Output {
        emitter: String,
        output: String,
        #[source]
        source: ProducerError,
    },

    #[error("emitter '{emitter}': {message}")]
    Invalid { emitter: String, message: String },
}

impl EmitterError {
    /// Name of the emitter that failed.
    pub fn emitter(&self) -> &str {
        match self {
            EmitterError::Template { emitter, .. }
            | EmitterError::Output { emitter, .. }
            | EmitterError::Invalid { emitter, .. } => emitter,
        }
    }
}

/// Why one record was not produced. Never stops the emitter.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("render failed: {0}")]
    Render(#[from] TemplateError),

    #[error("header template did not render a JSON object of strings: {0}")]
    Headers(#[from] serde_json::Error),

    #[error("produce failed: {0}")]
    Produce(#[from] ProducerError),
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("{} emitter(s) failed to start: {}", .0.len(), join_errors(.0))]
    Startup(Vec<EmitterError>),
}

fn join_errors(errors: &[EmitterError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_error_lists_every_emitter() {
        let err = SchedulerError::Startup(vec![
            EmitterError::Invalid {
                emitter: "a".into(),
                message: "num must be at least 1".into(),
            },
            EmitterError::Invalid {
                emitter: "b".into(),
                message: "bad".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 emitter(s) failed to start"));
        assert!(text.contains("emitter 'a': num must be at least 1"));
        assert!(text.contains("emitter 'b': bad"));
    }
}
