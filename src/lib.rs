//! datagen: a streaming synthetic data generator.
//!
//! Emitters render records from templates and hand them to producers, either
//! built in (`stdout`, `file`) or remote plugins speaking a line-delimited
//! JSON protocol over their stdin/stdout.
//!
//! # CLI Usage
//!
//! ```bash
//! # Run every emitter of a config file
//! datagen run --config emitters.yaml
//!
//! # Ten users every half second for a minute, reproducibly
//! datagen --seed 42 emit '{"id":"{{uuid}}","name":"{{name}}"}' -n 10 -f 500ms -d 1m
//!
//! # Write to files through the remote file plugin
//! datagen emit '{{name}}' -f 0 -n 100 -o datagen-file-plugin --param fileName=names.txt
//!
//! # Catalogs
//! datagen producer list
//! datagen function list
//! datagen template list
//! ```

pub mod config;
pub mod emit;
pub mod runtime;

pub use config::RunConfig;
pub use emit::EmitArgs;
pub use runtime::{execute, RunOptions};
