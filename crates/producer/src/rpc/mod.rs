//! Wire protocol between datagen and producer plugins.
//!
//! The parent starts the plugin with the magic cookie in its environment.
//! The plugin answers with one handshake line on stdout, then both sides
//! exchange newline-delimited JSON frames: the parent writes [`Request`]s to
//! the plugin's stdin and reads one [`Response`] per request from its stdout.
//! The plugin exits when its stdin closes. Plugin logs go to stderr.

mod frame;
mod handshake;

pub use frame::{Call, ProduceArgs, Request, Response};
pub use handshake::{
    negotiate, HandshakeConfig, MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE, PRODUCER_SERVICE,
    PROTOCOL_VERSION,
};
