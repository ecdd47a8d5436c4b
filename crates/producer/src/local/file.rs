//! File producer: appends records to a file chosen by config parameters.

use crate::error::ProducerError;
use crate::producer::{ProduceResponse, Producer};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

pub const OUTPUT_DIR_PARAM: &str = "outputDir";
pub const FILE_NAME_PARAM: &str = "fileName";

/// Appends each value, newline terminated, to `<outputDir>/<fileName>`.
///
/// Files stay open until [`Producer::close`].
#[derive(Default)]
pub struct FileProducer {
    files: Mutex<HashMap<PathBuf, File>>,
}

impl FileProducer {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(config_params: &HashMap<String, String>) -> Result<PathBuf, ProducerError> {
        let file_name = config_params
            .get(FILE_NAME_PARAM)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProducerError::MissingParameter(FILE_NAME_PARAM.to_string()))?;
        let dir = config_params
            .get(OUTPUT_DIR_PARAM)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(dir.join(file_name))
    }
}

#[async_trait]
impl Producer for FileProducer {
    async fn produce(
        &self,
        _key: &[u8],
        value: &[u8],
        _headers: &HashMap<String, String>,
        config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError> {
        let path = Self::target(config_params)?;
        let mut files = self.files.lock().await;
        if !files.contains_key(&path) {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            debug!("Opening output file {}", path.display());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            files.insert(path.clone(), file);
        }
        let Some(file) = files.get_mut(&path) else {
            return Err(ProducerError::Produce(format!(
                "output file {} is not open",
                path.display()
            )));
        };
        file.write_all(value).await?;
        file.write_all(b"\n").await?;
        Ok(ProduceResponse::new(
            value.len() as u64,
            path.display().to_string(),
        ))
    }

    async fn close(&self) -> Result<(), ProducerError> {
        let mut files = self.files.lock().await;
        for (path, mut file) in files.drain() {
            debug!("Closing output file {}", path.display());
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params(dir: &TempDir, name: &str) -> HashMap<String, String> {
        HashMap::from([
            (OUTPUT_DIR_PARAM.to_string(), dir.path().display().to_string()),
            (FILE_NAME_PARAM.to_string(), name.to_string()),
        ])
    }

    #[tokio::test]
    async fn test_appends_records() {
        let dir = TempDir::new().unwrap();
        let producer = FileProducer::new();
        let params = params(&dir, "out.json");
        let none = HashMap::new();

        producer.produce(b"", b"{\"a\":1}", &none, &params).await.unwrap();
        let response = producer.produce(b"", b"{\"a\":2}", &none, &params).await.unwrap();
        assert_eq!(response.bytes_written, 7);
        producer.close().await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
        assert_eq!(content, "{\"a\":1}\n{\"a\":2}\n");
    }

    #[tokio::test]
    async fn test_missing_file_name() {
        let producer = FileProducer::new();
        let none = HashMap::new();
        let err = producer.produce(b"", b"x", &none, &none).await.unwrap_err();
        assert!(matches!(err, ProducerError::MissingParameter(p) if p == FILE_NAME_PARAM));
    }
}
