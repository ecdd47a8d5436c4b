use crate::error::HandshakeError;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAGIC_COOKIE_KEY: &str = "JR_PRODUCER_PLUGIN";
pub const MAGIC_COOKIE_VALUE: &str = "producer";

/// Service name a producer plugin dispenses.
pub const PRODUCER_SERVICE: &str = "jr_producer";

/// Version and cookie one side of the handshake speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    pub protocol_version: u32,
    pub magic_cookie_key: String,
    pub magic_cookie_value: String,
}

impl HandshakeConfig {
    /// The handshake of datagen producer plugins.
    pub fn producer() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: MAGIC_COOKIE_KEY.to_string(),
            magic_cookie_value: MAGIC_COOKIE_VALUE.to_string(),
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse_line(line: &str) -> Result<Self, HandshakeError> {
        serde_json::from_str(line.trim()).map_err(|e| HandshakeError::Malformed(e.to_string()))
    }
}

/// Check the handshake a plugin offered against the one expected.
pub fn negotiate(
    expected: &HandshakeConfig,
    offered: &HandshakeConfig,
) -> Result<(), HandshakeError> {
    if offered.protocol_version != expected.protocol_version {
        return Err(HandshakeError::VersionMismatch {
            expected: expected.protocol_version,
            got: offered.protocol_version,
        });
    }
    if offered.magic_cookie_key != expected.magic_cookie_key
        || offered.magic_cookie_value != expected.magic_cookie_value
    {
        return Err(HandshakeError::CookieMismatch {
            key: expected.magic_cookie_key.clone(),
        });
    }
    Ok(())
}
