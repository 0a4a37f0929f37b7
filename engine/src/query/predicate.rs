//! Predicate expression tree
//!
//! Predicates are built functionally by the binder and handed to the store as
//! an immutable tree. The `Display` form is a SQL-like rendering used for logs
//! and diagnostics; stores are free to translate the tree however they like.

use std::fmt;

use super::value::Value;
use crate::schema::{ResolvedAttribute, ValueType};
use crate::utils::sql::{escape_like_pattern, quote_literal};

/// Attribute path resolved against the bound entity, with its value type
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRef {
    pub path: String,
    pub value_type: ValueType,
}

impl From<ResolvedAttribute> for AttributeRef {
    fn from(resolved: ResolvedAttribute) -> Self {
        Self {
            path: resolved.path,
            value_type: resolved.value_type,
        }
    }
}

/// Strict inequality used by range predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals {
        attribute: AttributeRef,
        value: Value,
    },
    /// Case-insensitive substring match over the attribute's textual form.
    /// `needle` is already lower-cased.
    Like {
        attribute: AttributeRef,
        needle: String,
    },
    Range {
        attribute: AttributeRef,
        bound: RangeBound,
        value: Value,
    },
    In {
        attribute: AttributeRef,
        values: Vec<Value>,
    },
    /// Inclusive on both ends
    Between {
        attribute: AttributeRef,
        low: Value,
        high: Value,
    },
    IsNull {
        attribute: AttributeRef,
    },
    IsNotNull {
        attribute: AttributeRef,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction of the given terms; a single term is returned as is
    pub fn and(mut terms: Vec<Predicate>) -> Option<Predicate> {
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Predicate::And(terms)),
        }
    }

    /// Disjunction of the given terms; a single term is returned as is
    pub fn or(mut terms: Vec<Predicate>) -> Option<Predicate> {
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Predicate::Or(terms)),
        }
    }

    pub fn like(attribute: AttributeRef, term: &str) -> Predicate {
        Predicate::Like {
            attribute,
            needle: term.to_lowercase(),
        }
    }

    /// Number of leaf comparisons in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::And(terms) | Predicate::Or(terms) => {
                terms.iter().map(Predicate::leaf_count).sum()
            }
            _ => 1,
        }
    }

    fn fmt_term(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(_) | Predicate::Or(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

fn fmt_joined(terms: &[Predicate], separator: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        term.fmt_term(f)?;
    }
    Ok(())
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals { attribute, value } => write!(f, "{} = {}", attribute.path, value),
            Predicate::Like { attribute, needle } => write!(
                f,
                "lower({}) LIKE {}",
                attribute.path,
                quote_literal(&format!("%{}%", escape_like_pattern(needle)))
            ),
            Predicate::Range {
                attribute,
                bound,
                value,
            } => {
                let op = match bound {
                    RangeBound::GreaterThan => ">",
                    RangeBound::LessThan => "<",
                };
                write!(f, "{} {} {}", attribute.path, op, value)
            }
            Predicate::In { attribute, values } => {
                let list: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "{} IN ({})", attribute.path, list.join(","))
            }
            Predicate::Between {
                attribute,
                low,
                high,
            } => write!(f, "{} BETWEEN {} AND {}", attribute.path, low, high),
            Predicate::IsNull { attribute } => write!(f, "{} IS NULL", attribute.path),
            Predicate::IsNotNull { attribute } => write!(f, "{} IS NOT NULL", attribute.path),
            Predicate::And(terms) => fmt_joined(terms, " AND ", f),
            Predicate::Or(terms) => fmt_joined(terms, " OR ", f),
        }
    }
}
