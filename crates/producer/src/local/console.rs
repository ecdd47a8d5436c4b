//! Console producer: one line per record.

use crate::error::ProducerError;
use crate::producer::{ProduceResponse, Producer};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Writes each value, newline terminated, to a writer (stdout by default).
pub struct ConsoleProducer {
    out: Mutex<Writer>,
}

impl ConsoleProducer {
    pub fn stdout() -> Self {
        Self::with_writer(tokio::io::stdout())
    }

    pub fn with_writer(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

#[async_trait]
impl Producer for ConsoleProducer {
    async fn produce(
        &self,
        _key: &[u8],
        value: &[u8],
        _headers: &HashMap<String, String>,
        _config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError> {
        let mut out = self.out.lock().await;
        out.write_all(value).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(ProduceResponse::new(value.len() as u64, ""))
    }

    async fn close(&self) -> Result<(), ProducerError> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}
