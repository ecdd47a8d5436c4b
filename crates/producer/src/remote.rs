//! Producer backed by a plugin child process.

use crate::error::{HandshakeError, ProducerError};
use crate::producer::{ProduceResponse, Producer};
use crate::rpc::{
    negotiate, Call, HandshakeConfig, ProduceArgs, Request, Response, PRODUCER_SERVICE,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// How to launch a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    /// Output name the plugin serves.
    pub name: String,
    pub program: PathBuf,
    /// Plugin configuration file, passed as the only argument when present.
    pub config: Option<PathBuf>,
}

impl PluginCommand {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }
}

struct Connection {
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// Talks to one plugin process over its stdin and stdout.
///
/// Calls are serialized: each request waits for its response before the next
/// request is written.
pub struct RemoteProducer {
    name: String,
    child: Mutex<Child>,
    conn: Mutex<Connection>,
}

impl RemoteProducer {
    /// Spawn the plugin, check its handshake and dispense the producer
    /// service.
    pub async fn launch(command: &PluginCommand) -> Result<Self, ProducerError> {
        let name = command.name.clone();
        let expected = HandshakeConfig::producer();

        let mut cmd = Command::new(&command.program);
        if let Some(config) = &command.config {
            cmd.arg(config);
        }
        cmd.env(&expected.magic_cookie_key, &expected.magic_cookie_value)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        info!(
            "Starting plugin '{}': {}",
            name,
            display_command(&command.program, command.config.as_deref())
        );
        let mut child = cmd.spawn().map_err(|source| ProducerError::Spawn {
            name: name.clone(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ProducerError::Rpc {
                name,
                message: "plugin stdio was not captured".to_string(),
            });
        };
        let mut stdout = BufReader::new(stdout).lines();

        let offered = match tokio::time::timeout(HANDSHAKE_TIMEOUT, stdout.next_line()).await {
            Err(_) => Err(HandshakeError::Timeout),
            Ok(Ok(None)) => Err(HandshakeError::Eof),
            Ok(Ok(Some(line))) => HandshakeConfig::parse_line(&line),
            Ok(Err(e)) => Err(HandshakeError::Malformed(e.to_string())),
        }
        .and_then(|offered| negotiate(&expected, &offered).map(|_| offered))
        .map_err(|source| ProducerError::Handshake {
            name: name.clone(),
            source,
        })?;
        debug!(
            "Plugin '{}' speaks protocol version {}",
            name, offered.protocol_version
        );

        let producer = Self {
            name,
            child: Mutex::new(child),
            conn: Mutex::new(Connection {
                stdin: Some(stdin),
                stdout,
                next_id: 1,
            }),
        };

        let dispensed = producer
            .call(Call::Dispense {
                service: PRODUCER_SERVICE.to_string(),
            })
            .await?;
        if let Some(message) = dispensed.error {
            return Err(ProducerError::Dispense {
                name: producer.name.clone(),
                service: PRODUCER_SERVICE.to_string(),
                message,
            });
        }

        Ok(producer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, call: Call) -> Result<Response, ProducerError> {
        let mut conn = self.conn.lock().await;
        let id = conn.next_id;
        conn.next_id += 1;

        let mut line = serde_json::to_string(&Request { id, call })?;
        line.push('\n');
        let Some(stdin) = conn.stdin.as_mut() else {
            return Err(self.disconnected());
        };
        if let Err(e) = stdin.write_all(line.as_bytes()).await {
            debug!("Plugin '{}' write failed: {}", self.name, e);
            return Err(self.disconnected());
        }
        stdin.flush().await?;

        let Some(reply) = conn.stdout.next_line().await? else {
            return Err(self.disconnected());
        };
        let response: Response = serde_json::from_str(&reply).map_err(|e| ProducerError::Rpc {
            name: self.name.clone(),
            message: format!("invalid response frame: {e}"),
        })?;
        if response.id != id {
            return Err(ProducerError::Rpc {
                name: self.name.clone(),
                message: format!("response id {} does not match request id {}", response.id, id),
            });
        }
        Ok(response)
    }

    fn disconnected(&self) -> ProducerError {
        ProducerError::Disconnected {
            name: self.name.clone(),
        }
    }
}

#[async_trait]
impl Producer for RemoteProducer {
    async fn produce(
        &self,
        key: &[u8],
        value: &[u8],
        headers: &HashMap<String, String>,
        config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError> {
        let response = self
            .call(Call::Produce(ProduceArgs {
                key: key.to_vec(),
                value: value.to_vec(),
                headers: headers.clone(),
                config_params: config_params.clone(),
            }))
            .await?;
        if let Some(message) = response.error {
            return Err(ProducerError::Produce(message));
        }
        response.result.ok_or_else(|| ProducerError::Rpc {
            name: self.name.clone(),
            message: "produce response carries no result".to_string(),
        })
    }

    /// Ask the plugin to close, then close its stdin and wait for it to exit.
    async fn close(&self) -> Result<(), ProducerError> {
        let remote = self.call(Call::Close).await;

        self.conn.lock().await.stdin.take();
        let mut child = self.child.lock().await;
        match tokio::time::timeout(EXIT_TIMEOUT, child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!("Plugin '{}' exited with {}", self.name, status);
            }
            Err(_) => {
                warn!(
                    "Plugin '{}' did not exit within {:?}, killing it",
                    self.name, EXIT_TIMEOUT
                );
                child.kill().await?;
            }
        }

        match remote?.error {
            Some(message) => Err(ProducerError::Rpc {
                name: self.name.clone(),
                message: format!("close failed: {message}"),
            }),
            None => Ok(()),
        }
    }
}

fn display_command(program: &Path, config: Option<&Path>) -> String {
    match config {
        Some(config) => format!("{} {}", program.display(), config.display()),
        None => program.display().to_string(),
    }
}
