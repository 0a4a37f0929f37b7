//! Value coercion
//!
//! Converts raw request strings into values of an attribute's declared type.
//! Failures are local: the caller drops the one filter that failed.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

use super::value::Value;
use crate::schema::ValueType;

/// Accepted date-time layouts, tried in order
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("'{raw}' is not a valid {expected}")]
    Invalid { raw: String, expected: String },

    #[error("'{raw}' is not one of {variants:?}")]
    UnknownVariant { raw: String, variants: Vec<String> },

    #[error("attribute of type {0} does not hold scalar values")]
    NotScalar(String),
}

fn invalid(raw: &str, value_type: &ValueType) -> CoercionError {
    CoercionError::Invalid {
        raw: raw.to_string(),
        expected: value_type.to_string(),
    }
}

fn parse<T: FromStr>(raw: &str, value_type: &ValueType) -> Result<T, CoercionError> {
    raw.parse::<T>().map_err(|_| invalid(raw, value_type))
}

/// Coerce a raw string into a value of the given type
pub fn coerce(raw: &str, value_type: &ValueType) -> Result<Value, CoercionError> {
    match value_type {
        ValueType::String => Ok(Value::String(raw.to_string())),
        ValueType::I32 => parse::<i32>(raw, value_type).map(|v| Value::Int(v.into())),
        ValueType::I64 => parse::<i64>(raw, value_type).map(Value::Int),
        ValueType::U32 => parse::<u32>(raw, value_type).map(|v| Value::UInt(v.into())),
        ValueType::U64 => parse::<u64>(raw, value_type).map(Value::UInt),
        ValueType::F32 => parse::<f32>(raw, value_type).map(|v| Value::Float(v.into())),
        ValueType::F64 => parse::<f64>(raw, value_type).map(Value::Float),
        ValueType::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(invalid(raw, value_type))
            }
        }
        ValueType::Decimal => Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map(Value::Decimal)
            .map_err(|_| invalid(raw, value_type)),
        ValueType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| invalid(raw, value_type)),
        ValueType::DateTime => DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(Value::DateTime)
            .ok_or_else(|| invalid(raw, value_type)),
        ValueType::Enum { variants } => {
            let canonical = raw.to_uppercase();
            variants
                .iter()
                .position(|v| *v == canonical)
                .map(|ordinal| Value::Enum {
                    variant: canonical,
                    ordinal,
                })
                .ok_or_else(|| CoercionError::UnknownVariant {
                    raw: raw.to_string(),
                    variants: variants.clone(),
                })
        }
        ValueType::Entity { .. } => Err(CoercionError::NotScalar(value_type.to_string())),
    }
}
