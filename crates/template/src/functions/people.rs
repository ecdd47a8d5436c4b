//! Person functions. `email` reuses the `name` and `surname` picked earlier
//! in the same record.

use super::{Arity, FunctionDef};
use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "name",
        arity: Arity::Exact(0),
        description: "random first name",
        func: name,
    },
    FunctionDef {
        name: "surname",
        arity: Arity::Exact(0),
        description: "random surname",
        func: surname,
    },
    FunctionDef {
        name: "gender",
        arity: Arity::Exact(0),
        description: "gender of the record's first name",
        func: gender,
    },
    FunctionDef {
        name: "email",
        arity: Arity::Exact(0),
        description: "email address built from the record's name and surname",
        func: email,
    },
];

const NAMES: &[(&str, &str)] = &[
    ("James", "M"),
    ("Mary", "F"),
    ("Robert", "M"),
    ("Patricia", "F"),
    ("John", "M"),
    ("Jennifer", "F"),
    ("Michael", "M"),
    ("Linda", "F"),
    ("Luca", "M"),
    ("Giulia", "F"),
    ("Marco", "M"),
    ("Sofia", "F"),
];

const SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rossi",
    "Russo", "Ferrari", "Esposito",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com", "example.org"];

fn name(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let (_, (name, gender)) = super::pick(ctx, NAMES);
    ctx.record.stash("_name", *name);
    ctx.record.stash("_gender", *gender);
    Ok(Value::Str(name.to_string()))
}

fn surname(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let (_, surname) = super::pick(ctx, SURNAMES);
    ctx.record.stash("_surname", *surname);
    Ok(Value::Str(surname.to_string()))
}

fn gender(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    if ctx.record.stashed("_gender").is_none() {
        name(ctx, args)?;
    }
    Ok(ctx.record.stashed("_gender").unwrap_or_default().into())
}

fn email(ctx: &mut RenderContext<'_>, args: &[Value]) -> Result<Value, FunctionError> {
    if ctx.record.stashed("_name").is_none() {
        name(ctx, args)?;
    }
    if ctx.record.stashed("_surname").is_none() {
        surname(ctx, args)?;
    }
    let first = ctx.record.stashed("_name").unwrap_or_default().to_lowercase();
    let last = ctx
        .record
        .stashed("_surname")
        .unwrap_or_default()
        .to_lowercase();
    let domain = EMAIL_DOMAINS[ctx.random().int_n(EMAIL_DOMAINS.len())];
    Ok(Value::Str(format!("{first}.{last}@{domain}")))
}
