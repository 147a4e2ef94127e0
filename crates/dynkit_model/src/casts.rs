//! Built-in cast functions for [`FieldOptions::cast`](crate::FieldOptions::cast).

use crate::error::CastError;
use crate::value::Value;

// i64::MAX is not representable; it rounds up to 2^63.
const INT_RANGE: core::ops::Range<f64> = (i64::MIN as f64)..(i64::MAX as f64);

/// Converts to an integer.
///
/// Accepts integers, booleans, strings holding an integer literal and floats
/// whose truncated value fits in an `i64`.
///
/// # Errors
///
/// Returns a [`CastError`] for any other value.
pub fn to_int(value: Value) -> Result<Value, CastError> {
    match value {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Float(f) if INT_RANGE.contains(&f.trunc()) => Ok(Value::Int(f.trunc() as i64)),
        Value::Float(f) => Err(CastError::new(format!("float {f} is out of int range"))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| CastError::new(format!("invalid literal for int: {s:?}"))),
        other => Err(CastError::new(format!(
            "cannot convert {} to int",
            other.type_name()
        ))),
    }
}

/// Converts to a float.
///
/// Accepts floats, integers, booleans and strings holding a number.
///
/// # Errors
///
/// Returns a [`CastError`] for any other value.
pub fn to_float(value: Value) -> Result<Value, CastError> {
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CastError::new(format!("could not convert string to float: {s:?}"))),
        other => other.as_f64().map(Value::Float).ok_or_else(|| {
            CastError::new(format!("cannot convert {} to float", other.type_name()))
        }),
    }
}

/// Converts to a string. Strings are kept as is, everything else uses its
/// display form.
///
/// # Errors
///
/// Never fails; the signature matches the other casts.
pub fn to_str(value: Value) -> Result<Value, CastError> {
    match value {
        Value::Str(s) => Ok(Value::Str(s)),
        other => Ok(Value::Str(other.to_string())),
    }
}

/// Converts to a boolean.
///
/// Numbers are `true` when non-zero, lists and maps when non-empty, `null` is
/// `false`. Strings must be one of `true`/`false`, `yes`/`no`, `on`/`off`,
/// `1`/`0` (case-insensitive).
///
/// # Errors
///
/// Returns a [`CastError`] for unrecognized strings and models.
pub fn to_bool(value: Value) -> Result<Value, CastError> {
    let b = match &value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Int(n) => *n != 0,
        Value::Float(f) => *f != 0.0,
        Value::List(items) => !items.is_empty(),
        Value::Map(map) => !map.is_empty(),
        Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" | "" => false,
            _ => return Err(CastError::new(format!("invalid literal for bool: {s:?}"))),
        },
        Value::Model(_) => {
            return Err(CastError::new(format!(
                "cannot convert {} to bool",
                value.type_name()
            )));
        }
    };
    Ok(Value::Bool(b))
}
