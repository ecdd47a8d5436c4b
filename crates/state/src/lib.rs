//! Generation state for datagen templates.
//!
//! Two kinds of state exist while a run is active:
//!
//! - [`GenerationState`] is shared by every emitter of the run: aggregate
//!   execution counters, named counters, named lists, the CSV table and
//!   values persisted on purpose with `set_v`. Counters, lists and persisted
//!   values each live in their own concurrent map, so unrelated names never
//!   contend on one lock.
//! - [`RecordState`] is scratch space for one record: the "last selected"
//!   indices and stashed values (`_city`, `_name`, ...) that let a later
//!   field agree with an earlier one. A fresh one is created for every
//!   record, so nothing leaks into the next record.

pub mod csv_table;
pub mod error;
pub mod execution;
pub mod record;
pub mod shared;

pub use csv_table::CsvTable;
pub use error::StateError;
pub use execution::{Execution, ExecutionSnapshot};
pub use record::RecordState;
pub use shared::GenerationState;
