//! Address functions. `city` and `zip` agree within a record, as do
//! `country` and `country_code`.

use super::{Arity, FunctionDef};
use crate::error::FunctionError;
use crate::template::RenderContext;
use crate::value::Value;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "city",
        arity: Arity::Exact(0),
        description: "random city for the record's locale",
        func: city,
    },
    FunctionDef {
        name: "zip",
        arity: Arity::Exact(0),
        description: "zip code of the record's city",
        func: zip,
    },
    FunctionDef {
        name: "country",
        arity: Arity::Exact(0),
        description: "random country name",
        func: country,
    },
    FunctionDef {
        name: "country_code",
        arity: Arity::Exact(0),
        description: "ISO code of the record's country",
        func: country_code,
    },
];

struct City {
    name: &'static str,
    zip: &'static str,
}

const US_CITIES: &[City] = &[
    City { name: "New York", zip: "10001" },
    City { name: "Los Angeles", zip: "90001" },
    City { name: "Chicago", zip: "60601" },
    City { name: "Houston", zip: "77001" },
    City { name: "Phoenix", zip: "85001" },
    City { name: "Philadelphia", zip: "19019" },
    City { name: "San Antonio", zip: "78201" },
    City { name: "San Diego", zip: "92101" },
    City { name: "Dallas", zip: "75201" },
    City { name: "Boston", zip: "02108" },
    City { name: "Seattle", zip: "98101" },
    City { name: "Denver", zip: "80201" },
];

const IT_CITIES: &[City] = &[
    City { name: "Roma", zip: "00118" },
    City { name: "Milano", zip: "20121" },
    City { name: "Napoli", zip: "80121" },
    City { name: "Torino", zip: "10121" },
    City { name: "Palermo", zip: "90121" },
    City { name: "Genova", zip: "16121" },
    City { name: "Bologna", zip: "40121" },
    City { name: "Firenze", zip: "50121" },
];

const COUNTRIES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("Italy", "IT"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Spain", "ES"),
    ("United Kingdom", "GB"),
    ("Canada", "CA"),
    ("Japan", "JP"),
    ("Brazil", "BR"),
    ("Australia", "AU"),
];

fn cities(locale: &str) -> &'static [City] {
    match locale {
        "it" => IT_CITIES,
        _ => US_CITIES,
    }
}

fn city(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let table = cities(ctx.record.locale());
    let (index, city) = super::pick(ctx, table);
    ctx.record.city_index = Some(index);
    ctx.record.stash("_city", city.name);
    Ok(Value::Str(city.name.to_string()))
}

/// Zip of the city chosen earlier in this record, or of a fresh random city.
fn zip(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let table = cities(ctx.record.locale());
    let index = match ctx.record.city_index {
        Some(index) if index < table.len() => index,
        _ => {
            let index = ctx.random().int_n(table.len());
            ctx.record.city_index = Some(index);
            index
        }
    };
    Ok(Value::Str(table[index].zip.to_string()))
}

fn country(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let (index, (name, _)) = super::pick(ctx, COUNTRIES);
    ctx.record.country_index = Some(index);
    Ok(Value::Str(name.to_string()))
}

fn country_code(ctx: &mut RenderContext<'_>, _args: &[Value]) -> Result<Value, FunctionError> {
    let index = match ctx.record.country_index {
        Some(index) => index,
        None => {
            let index = ctx.random().int_n(COUNTRIES.len());
            ctx.record.country_index = Some(index);
            index
        }
    };
    Ok(Value::Str(COUNTRIES[index].1.to_string()))
}
