//! Plain random draws.

use super::{float_arg, int_arg, str_arg, Arity, FunctionDef};
use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "integer",
        arity: Arity::Exact(2),
        description: "random integer in [min, max)",
        func: integer,
    },
    FunctionDef {
        name: "floating",
        arity: Arity::Exact(2),
        description: "random float in [min, max)",
        func: floating,
    },
    FunctionDef {
        name: "randoms",
        arity: Arity::Exact(1),
        description: "random element of a '|' separated list",
        func: randoms,
    },
    FunctionDef {
        name: "uuid",
        arity: Arity::Exact(0),
        description: "random v4 UUID",
        func: uuid,
    },
    FunctionDef {
        name: "index",
        arity: Arity::Exact(0),
        description: "iteration index of the current record",
        func: index,
    },
];

fn integer(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let min = int_arg(args, 0)?;
    let max = int_arg(args, 1)?;
    if max <= min {
        return Err(FunctionError::Invalid(format!(
            "max ({max}) must be greater than min ({min})"
        )));
    }
    let span = max.checked_sub(min).ok_or_else(|| {
        FunctionError::Invalid(format!("range {min}..{max} is wider than a 64-bit integer"))
    })?;
    Ok(Value::Int(min + ctx.random().int64_n(span)))
}

fn floating(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let min = float_arg(args, 0)?;
    let max = float_arg(args, 1)?;
    Ok(Value::Float(min + ctx.random().float64() * (max - min)))
}

fn randoms(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let joined = str_arg(args, 0);
    let choices: Vec<&str> = joined.split('|').collect();
    let (_, choice) = super::pick(ctx, &choices);
    Ok(Value::Str(choice.to_string()))
}

fn uuid(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::Str(ctx.random().uuid().to_string()))
}

fn index(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::Int(ctx.record.iteration() as i64))
}
