//! FFI layer between interpreter values and protocol atoms
//!
//! Lifts values out of the interpreter heap into [`DynamicValue`]. Lifting
//! precedence, first match wins:
//!
//! 1. boolean -> `Bool`
//! 2. int-tagged number, or BigInt within `i64` -> `Int`
//! 3. other number -> `Int` when integral and exact, else `Float`; a BigInt
//!    outside `i64` becomes the nearest `Float`
//! 4. string -> `Text`
//! 5. array, `Set` or typed array -> `Collection` of elements lifted by 1-4
//! 6. anything else -> `Opaque`

use ember_core::DynamicValue;
use rquickjs::{Array, Ctx, Function, Type, Value};

// Iterable collections that are not plain arrays, flattened to an array.
const COLLECTION_TO_ARRAY: &str =
    "(v) => (v instanceof Set || ArrayBuffer.isView(v)) ? Array.from(v) : undefined";

// Decimal text when the BigInt fits in 64 bits, else its nearest double.
const BIGINT_NARROW: &str = "(v) => BigInt.asIntN(64, v) === v ? String(v) : Number(v)";

/// Lift a value produced by the interpreter.
pub fn lift<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> rquickjs::Result<DynamicValue> {
    if let Some(scalar) = lift_scalar(ctx, value)? {
        return Ok(scalar);
    }

    let Some(items) = collection_items(ctx, value)? else {
        return Ok(DynamicValue::Opaque(type_name(value)));
    };

    let mut elements = Vec::with_capacity(items.len());
    for idx in 0..items.len() {
        let item: Value = items.get(idx)?;
        let element = match lift_scalar(ctx, &item)? {
            Some(scalar) => scalar,
            // Nested contents are never encoded, so they are not lifted either.
            None if item.is_array() => DynamicValue::Collection(Vec::new()),
            None => DynamicValue::Opaque(type_name(&item)),
        };
        elements.push(element);
    }
    Ok(DynamicValue::Collection(elements))
}

fn lift_scalar<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> rquickjs::Result<Option<DynamicValue>> {
    let lifted = match value.type_of() {
        Type::Bool => value.as_bool().map(DynamicValue::Bool),
        Type::Int => value.as_int().map(|n| DynamicValue::Int(i64::from(n))),
        Type::BigInt => lift_big_int(ctx, value)?,
        Type::Float => value.as_float().map(DynamicValue::from_number),
        Type::String => match value.as_string() {
            Some(text) => Some(DynamicValue::Text(text.to_string()?)),
            None => None,
        },
        _ => None,
    };
    Ok(lifted)
}

fn lift_big_int<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> rquickjs::Result<Option<DynamicValue>> {
    let helper: Function = ctx.eval(BIGINT_NARROW)?;
    let narrowed: Value = helper.call((value.clone(),))?;
    if let Some(text) = narrowed.as_string() {
        return Ok(text.to_string()?.parse().ok().map(DynamicValue::Int));
    }
    Ok(narrowed.as_number().map(DynamicValue::Float))
}

fn collection_items<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> rquickjs::Result<Option<Array<'js>>> {
    if let Some(array) = value.as_array() {
        return Ok(Some(array.clone()));
    }
    if !value.is_object() {
        return Ok(None);
    }

    let helper: Function = ctx.eval(COLLECTION_TO_ARRAY)?;
    let items: Value = helper.call((value.clone(),))?;
    Ok(items.as_array().cloned())
}

fn type_name(value: &Value<'_>) -> &'static str {
    if value.is_undefined() {
        "undefined"
    } else if value.is_null() {
        "null"
    } else if value.is_function() {
        "function"
    } else if value.is_symbol() {
        "symbol"
    } else if matches!(value.type_of(), Type::BigInt) {
        "bigint"
    } else {
        "object"
    }
}
