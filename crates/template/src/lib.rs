//! Template compiler and generator functions.
//!
//! Templates are literal text with `{{ ... }}` actions. An action is a
//! field reference (`.V`), a literal, or a function call whose arguments
//! may be literals, fields, or parenthesised calls; `|` pipes a result in
//! as the last argument of the next call.
//!
//! ```text
//! {{name}} lives in {{city}} ({{zip}}), id {{counter "id" 1 1}}
//! {{ "hello" | upper }}
//! ```
//!
//! Templates are compiled once ([`Template::compile`]) and rendered for
//! every record against a [`RenderContext`], which carries the shared
//! [`GenerationState`](datagen_state::GenerationState) and a fresh
//! [`RecordState`](datagen_state::RecordState).
//!
//! # Example
//!
//! ```rust
//! use datagen_state::{GenerationState, RecordState};
//! use datagen_template::{RenderContext, Template};
//! use std::collections::HashMap;
//!
//! let template = Template::compile("value", r#"id={{counter "id" 1 1}}"#).unwrap();
//! let shared = GenerationState::default();
//! let mut record = RecordState::new(0, "us");
//! let data = HashMap::new();
//! let mut ctx = RenderContext::new(&shared, &mut record, &data);
//! assert_eq!(template.render(&mut ctx).unwrap(), "id=1");
//! ```

pub mod error;
pub mod functions;
pub mod loader;
mod parser;
pub mod template;
pub mod value;

pub use error::{FunctionError, TemplateError};
pub use functions::{Arity, FunctionDef, FunctionMap, TemplateFn};
pub use loader::{DataDirs, TemplateSource};
pub use template::{RenderContext, Template};
pub use value::Value;
