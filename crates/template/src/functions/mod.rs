//! Generator functions callable from templates.
//!
//! Each function receives the [`RenderContext`] of the record being rendered
//! and its evaluated arguments. Argument counts are checked when a template
//! compiles, argument types when it renders.

mod address;
mod people;
mod random;
mod state;
mod text;

use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Signature shared by every template function.
pub type TemplateFn = fn(&mut RenderContext<'_>, &[Value]) -> Result<Value, FunctionError>;

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, argc: usize) -> bool {
        match *self {
            Arity::Exact(n) => argc == n,
            Arity::Between(min, max) => (min..=max).contains(&argc),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// A named template function.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    pub name: &'static str,
    pub arity: Arity,
    pub description: &'static str,
    pub func: TemplateFn,
}

/// Functions available to templates, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FunctionMap {
    functions: BTreeMap<&'static str, FunctionDef>,
}

impl FunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in function catalog.
    pub fn builtin() -> &'static FunctionMap {
        static BUILTIN: OnceLock<FunctionMap> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut map = FunctionMap::new();
            for def in state::FUNCTIONS
                .iter()
                .chain(random::FUNCTIONS)
                .chain(address::FUNCTIONS)
                .chain(people::FUNCTIONS)
                .chain(text::FUNCTIONS)
            {
                map.register(*def);
            }
            map
        })
    }

    /// Add or replace a function.
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Functions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

pub(crate) fn str_arg(args: &[Value], index: usize) -> String {
    args.get(index).map(Value::to_string).unwrap_or_default()
}

pub(crate) fn int_arg(args: &[Value], index: usize) -> Result<i64, FunctionError> {
    let value = args.get(index).cloned().unwrap_or_default();
    value.as_int().ok_or_else(|| FunctionError::ArgType {
        index,
        expected: "an integer",
        got: value.to_string(),
    })
}

pub(crate) fn usize_arg(args: &[Value], index: usize) -> Result<usize, FunctionError> {
    let n = int_arg(args, index)?;
    usize::try_from(n).map_err(|_| FunctionError::ArgType {
        index,
        expected: "a non-negative integer",
        got: n.to_string(),
    })
}

pub(crate) fn float_arg(args: &[Value], index: usize) -> Result<f64, FunctionError> {
    let value = args.get(index).cloned().unwrap_or_default();
    value.as_float().ok_or_else(|| FunctionError::ArgType {
        index,
        expected: "a number",
        got: value.to_string(),
    })
}

/// Pick an entry of `table`, recording the index as the record's last index.
pub(crate) fn pick<'t, T>(ctx: &mut RenderContext<'_>, table: &'t [T]) -> (usize, &'t T) {
    let index = ctx.random().int_n(table.len());
    ctx.record.last_index = Some(index);
    (index, &table[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let map = FunctionMap::builtin();
        for name in [
            "counter",
            "add_v_to_list",
            "random_v_from_list",
            "random_n_v_from_list",
            "get_v_from_list_at_index",
            "set_v",
            "get_v",
            "fromcsv",
            "integer",
            "floating",
            "randoms",
            "uuid",
            "index",
            "city",
            "zip",
            "country",
            "country_code",
            "name",
            "surname",
            "gender",
            "email",
            "join",
            "upper",
            "lower",
        ] {
            assert!(map.get(name).is_some(), "missing function {name}");
        }
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(1));
        assert!(Arity::Between(1, 2).accepts(1));
        assert!(!Arity::Between(1, 2).accepts(3));
        assert_eq!(Arity::Between(1, 2).to_string(), "1 to 2");
    }

    #[test]
    fn test_int_arg_errors() {
        let args = vec![Value::Str("abc".into())];
        assert!(matches!(
            int_arg(&args, 0),
            Err(FunctionError::ArgType { index: 0, .. })
        ));
        assert!(matches!(
            usize_arg(&[Value::Int(-1)], 0),
            Err(FunctionError::ArgType { .. })
        ));
    }
}
