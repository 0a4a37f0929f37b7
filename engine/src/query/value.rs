//! Typed filter values

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::utils::sql::quote_literal;

/// A request value coerced to an attribute's declared type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Canonical variant name and its declaration index
    Enum { variant: String, ordinal: usize },
}

impl Value {
    /// Compare two values of the same kind; `None` for mismatched kinds or NaN.
    ///
    /// Enums order by declaration index, not by name.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::UInt(a), Value::UInt(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Enum { ordinal: a, .. }, Value::Enum { ordinal: b, .. }) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", quote_literal(s)),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "'{}'", v.format("%Y-%m-%d")),
            Value::DateTime(v) => write!(f, "'{}'", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Enum { variant, .. } => write!(f, "{}", quote_literal(variant)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(Value::Int(1).compare(&Value::Int(2)), Some(Ordering::Less));
        assert_eq!(
            Value::String("b".into()).compare(&Value::String("a".into())),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_mismatched_kinds() {
        assert_eq!(Value::Int(1).compare(&Value::UInt(1)), None);
    }

    #[test]
    fn test_compare_enum_by_ordinal() {
        let active = Value::Enum {
            variant: "ACTIVE".into(),
            ordinal: 1,
        };
        let archived = Value::Enum {
            variant: "ARCHIVED".into(),
            ordinal: 0,
        };
        assert_eq!(active.compare(&archived), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_nan_is_unordered() {
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(Value::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()).to_string(),
            "'2024-01-31'"
        );
    }
}
