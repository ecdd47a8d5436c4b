//! Producers: where rendered records go.
//!
//! Every sink implements [`Producer`]. An output name resolves either to a
//! local producer registered in the [`LocalRegistry`] (`stdout`, `file`) or,
//! failing that, to a plugin: a child process started from that name which
//! speaks the [`rpc`] protocol. A [`PluginPool`] owns the plugins of one
//! run, opening each output at most once and closing all of them at the end.
//!
//! Plugin binaries are written with [`serve`].

pub mod error;
pub mod local;
pub mod pool;
pub mod producer;
pub mod remote;
pub mod rpc;
pub mod serve;

pub use error::{HandshakeError, ProducerError};
pub use local::{ConsoleProducer, FileProducer, LocalFactory, LocalRegistry};
pub use pool::{find_plugin_config, CloseSummary, Plugin, PluginKind, PluginPool};
pub use producer::{ProduceResponse, Producer};
pub use remote::{PluginCommand, RemoteProducer};
pub use serve::{serve, serve_io};
