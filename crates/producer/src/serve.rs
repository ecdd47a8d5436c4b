//! Plugin side of the protocol: turn any [`Producer`] into a plugin binary.
//!
//! ```rust,no_run
//! use datagen_producer::{serve, FileProducer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     serve(FileProducer::new()).await?;
//!     Ok(())
//! }
//! ```

use crate::error::ProducerError;
use crate::producer::Producer;
use crate::rpc::{Call, HandshakeConfig, Request, Response, MAGIC_COOKIE_KEY, PRODUCER_SERVICE};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, warn};

/// Serve `producer` over stdin/stdout until stdin closes.
///
/// Fails without touching stdout when the magic cookie is missing, which
/// means the binary was not started by datagen.
pub async fn serve<P: Producer>(producer: P) -> Result<(), ProducerError> {
    let handshake = HandshakeConfig::producer();
    let launched = std::env::var(&handshake.magic_cookie_key)
        .is_ok_and(|value| value == handshake.magic_cookie_value);
    if !launched {
        return Err(ProducerError::NotLaunchedAsPlugin(MAGIC_COOKIE_KEY));
    }
    serve_io(&producer, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Write the handshake, then answer request frames from `reader` until EOF.
pub async fn serve_io<P, R, W>(producer: &P, reader: R, mut writer: W) -> Result<(), ProducerError>
where
    P: Producer + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_line(&mut writer, &HandshakeConfig::producer().to_line()?).await?;

    let mut lines = BufReader::new(reader).lines();
    let mut dispensed = false;
    let mut closed = false;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(Request { id, call }) => match call {
                Call::Dispense { service } if service == PRODUCER_SERVICE => {
                    debug!("Dispensing service '{}'", service);
                    dispensed = true;
                    Response::ok(id)
                }
                Call::Dispense { service } => {
                    Response::failed(id, format!("unknown service '{service}'"))
                }
                Call::Produce(_) if !dispensed => {
                    Response::failed(id, format!("service '{PRODUCER_SERVICE}' was not dispensed"))
                }
                Call::Produce(args) => match producer
                    .produce(&args.key, &args.value, &args.headers, &args.config_params)
                    .await
                {
                    Ok(produced) => Response::produced(id, produced),
                    Err(e) => {
                        warn!("Produce failed: {}", e);
                        Response::failed(id, e)
                    }
                },
                Call::Close => {
                    closed = true;
                    match producer.close().await {
                        Ok(()) => Response::ok(id),
                        Err(e) => Response::failed(id, e),
                    }
                }
            },
            Err(e) => {
                warn!("Ignoring malformed request frame: {}", e);
                Response::failed(0, format!("malformed request: {e}"))
            }
        };
        write_line(&mut writer, &serde_json::to_string(&response)?).await?;
    }

    debug!("Connection closed by datagen");
    if !closed {
        if let Err(e) = producer.close().await {
            error!("Failed to close producer: {}", e);
        }
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
