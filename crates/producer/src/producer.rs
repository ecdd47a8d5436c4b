//! The contract every sink implements, local or remote.

use crate::error::ProducerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of one successful produce call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceResponse {
    /// Bytes the sink actually wrote; feeds the run's byte counters.
    pub bytes_written: u64,
    pub message: String,
}

impl ProduceResponse {
    pub fn new(bytes_written: u64, message: impl Into<String>) -> Self {
        Self {
            bytes_written,
            message: message.into(),
        }
    }
}

/// A data sink.
///
/// One instance may be shared by several emitters, so implementations take
/// `&self` and synchronize internally.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn produce(
        &self,
        key: &[u8],
        value: &[u8],
        headers: &HashMap<String, String>,
        config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError>;

    /// Release the sink. Called once per run.
    async fn close(&self) -> Result<(), ProducerError>;
}
