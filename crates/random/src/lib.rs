//! Randomness source shared by every generator function.
//!
//! All draws made while rendering templates go through [`RandomSource`],
//! which runs in one of two modes:
//!
//! - **unseeded**: backed by the thread-local generator, safe to use from
//!   any number of emitter tasks, not reproducible across runs.
//! - **seeded**: a single generator built from an expanded 64-bit seed.
//!   Every draw takes the same lock, so a run with a fixed seed and a fixed
//!   draw order produces identical output.
//!
//! ```text
//! seed: i64 ──► -1 ───────────────► Unseeded (rand::rng())
//!          └──► S  ─► [S, S+1000, S+2000, S+3000] (LE) ─► StdRng
//! ```
//!
//! UUIDs are built from bytes drawn from the same source, so reseeding
//! also reseeds the ID sequence.

pub mod seed;
pub mod source;

pub use seed::{create_byte_seed, UNSEEDED};
pub use source::{global, set_global_seed, RandomSource};
