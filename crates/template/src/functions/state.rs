//! Functions over the shared generation state.

use super::{int_arg, str_arg, usize_arg, Arity, FunctionDef};
use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "counter",
        arity: Arity::Exact(3),
        description: "named counter: returns start on first use, then previous + step",
        func: counter,
    },
    FunctionDef {
        name: "add_v_to_list",
        arity: Arity::Exact(2),
        description: "appends a value to a named list",
        func: add_v_to_list,
    },
    FunctionDef {
        name: "random_v_from_list",
        arity: Arity::Exact(1),
        description: "random value from a named list",
        func: random_v_from_list,
    },
    FunctionDef {
        name: "random_n_v_from_list",
        arity: Arity::Exact(2),
        description: "n values from distinct positions of a named list",
        func: random_n_v_from_list,
    },
    FunctionDef {
        name: "get_v_from_list_at_index",
        arity: Arity::Exact(2),
        description: "value at an index of a named list",
        func: get_v_from_list_at_index,
    },
    FunctionDef {
        name: "set_v",
        arity: Arity::Exact(2),
        description: "persists a value across records",
        func: set_v,
    },
    FunctionDef {
        name: "get_v",
        arity: Arity::Exact(1),
        description: "value stashed in this record, else a persisted value",
        func: get_v,
    },
    FunctionDef {
        name: "fromcsv",
        arity: Arity::Exact(1),
        description: "column of the CSV row for this record's iteration",
        func: fromcsv,
    },
];

fn counter(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let name = str_arg(args, 0);
    let start = int_arg(args, 1)?;
    let step = int_arg(args, 2)?;
    Ok(Value::Int(ctx.shared.counter(&name, start, step)))
}

fn add_v_to_list(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    ctx.shared
        .add_value_to_list(&str_arg(args, 0), str_arg(args, 1));
    Ok(Value::Str(String::new()))
}

fn random_v_from_list(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    match ctx.shared.random_value_from_list(&str_arg(args, 0)) {
        Some((index, value)) => {
            ctx.record.last_index = Some(index);
            Ok(Value::Str(value))
        }
        None => Ok(Value::Str(String::new())),
    }
}

fn random_n_v_from_list(
    ctx: &mut RenderContext<'_>,
    args: &[Value],
) -> Result<Value, FunctionError> {
    let n = usize_arg(args, 1)?;
    let values = ctx.shared.random_n_values_from_list(&str_arg(args, 0), n);
    Ok(Value::List(values.into_iter().map(Value::Str).collect()))
}

fn get_v_from_list_at_index(
    ctx: &mut RenderContext<'_>,
    args: &[Value],
) -> Result<Value, FunctionError> {
    let index = usize_arg(args, 1)?;
    Ok(ctx
        .shared
        .value_from_list_at_index(&str_arg(args, 0), index)
        .into())
}

fn set_v(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    ctx.shared.set_value(&str_arg(args, 0), str_arg(args, 1));
    Ok(Value::Str(String::new()))
}

fn get_v(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let key = str_arg(args, 0);
    if let Some(value) = ctx.record.stashed(&key) {
        return Ok(Value::Str(value.to_string()));
    }
    Ok(ctx.shared.value(&key).into())
}

fn fromcsv(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    let iteration = ctx.record.iteration();
    Ok(ctx.shared.from_csv_at(iteration, &str_arg(args, 0)).into())
}
