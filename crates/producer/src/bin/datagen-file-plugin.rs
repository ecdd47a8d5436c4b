//! Producer plugin appending records to files.
//!
//! Started by datagen with an optional JSON configuration file whose string
//! values are defaults for the per-record config parameters, e.g.
//! `{"outputDir": "/tmp/out", "fileName": "records.json"}`.

use anyhow::Context;
use async_trait::async_trait;
use datagen_producer::{serve, FileProducer, ProduceResponse, Producer, ProducerError};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

struct ConfiguredFileProducer {
    defaults: HashMap<String, String>,
    inner: FileProducer,
}

#[async_trait]
impl Producer for ConfiguredFileProducer {
    async fn produce(
        &self,
        key: &[u8],
        value: &[u8],
        headers: &HashMap<String, String>,
        config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError> {
        let mut params = self.defaults.clone();
        params.extend(config_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.inner.produce(key, value, headers, &params).await
    }

    async fn close(&self) -> Result<(), ProducerError> {
        self.inner.close().await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let defaults = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read plugin configuration {path}"))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid plugin configuration {path}"))?
        }
        None => HashMap::new(),
    };

    serve(ConfiguredFileProducer {
        defaults,
        inner: FileProducer::new(),
    })
    .await?;
    Ok(())
}
