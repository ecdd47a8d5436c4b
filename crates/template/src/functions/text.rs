//! String helpers.

use super::{str_arg, Arity, FunctionDef};
use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "join",
        arity: Arity::Exact(2),
        description: "joins a list with a separator",
        func: join,
    },
    FunctionDef {
        name: "upper",
        arity: Arity::Exact(1),
        description: "upper-cases a string",
        func: upper,
    },
    FunctionDef {
        name: "lower",
        arity: Arity::Exact(1),
        description: "lower-cases a string",
        func: lower,
    },
];

fn join(_ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let separator = str_arg(args, 1);
    let joined = match args.first().unwrap_or(&Value::Null) {
        Value::List(items) => items
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(&separator),
        other => other.to_string(),
    };
    Ok(Value::Str(joined))
}

fn upper(_ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::Str(str_arg(args, 0).to_uppercase()))
}

fn lower(_ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::Str(str_arg(args, 0).to_lowercase()))
}
