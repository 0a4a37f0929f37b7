//! Predicate builder
//!
//! Turns the search term and active filters of a resolved request into one
//! predicate tree. A filter that cannot be applied is dropped with a warning;
//! it never fails the request.

use thiserror::Error;

use super::coerce::{CoercionError, coerce};
use super::params::ActiveFilter;
use super::predicate::{AttributeRef, Predicate, RangeBound};
use super::value::Value;
use crate::core::constants::{NOT_NULL_LITERAL, NULL_LITERAL};
use crate::schema::{FilterOp, PathError, SchemaRegistry};
use crate::utils::string::{is_blank, split_list};

/// Reason a single filter or search attribute was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("attribute '{0}' is not a scalar value")]
    NotScalar(String),
}

/// Builds predicates for one entity type
pub struct PredicateBuilder<'a> {
    schemas: &'a SchemaRegistry,
    entity: &'a str,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(schemas: &'a SchemaRegistry, entity: &'a str) -> Self {
        Self { schemas, entity }
    }

    fn attribute(&self, path: &str) -> Result<AttributeRef, FilterError> {
        Ok(self.schemas.resolve_path(self.entity, path)?.into())
    }

    fn scalar_attribute(&self, path: &str) -> Result<AttributeRef, FilterError> {
        let attribute = self.attribute(path)?;
        if !attribute.value_type.is_scalar() {
            return Err(FilterError::NotScalar(attribute.path));
        }
        Ok(attribute)
    }

    /// Combine search and filters into one conjunction; `None` means unfiltered
    pub fn build(
        &self,
        search_attributes: &[String],
        search_term: Option<&str>,
        filters: &[ActiveFilter],
    ) -> Option<Predicate> {
        let mut terms = Vec::with_capacity(filters.len() + 1);

        if let Some(search) = search_term.and_then(|term| self.search(search_attributes, term)) {
            terms.push(search);
        }

        for filter in filters {
            match self.filter(filter) {
                Ok(Some(predicate)) => terms.push(predicate),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        param = %filter.descriptor.param_name,
                        value = %filter.raw_value,
                        error = %e,
                        "Failed to apply filter, skipping"
                    );
                }
            }
        }

        Predicate::and(terms)
    }

    /// Case-insensitive substring match OR-ed across the search attributes
    pub fn search(&self, search_attributes: &[String], term: &str) -> Option<Predicate> {
        if is_blank(term) || search_attributes.is_empty() {
            return None;
        }

        let terms = search_attributes
            .iter()
            .filter_map(|path| match self.scalar_attribute(path) {
                Ok(attribute) => Some(Predicate::like(attribute, term)),
                Err(e) => {
                    tracing::warn!(attribute = %path, error = %e, "Invalid search attribute, skipping");
                    None
                }
            })
            .collect();

        Predicate::or(terms)
    }

    /// Predicate for one active filter.
    ///
    /// `Ok(None)` is a deliberate no-op (a `Between` value without exactly two
    /// parts); `Err` is a local failure the caller logs and skips.
    pub fn filter(&self, filter: &ActiveFilter) -> Result<Option<Predicate>, FilterError> {
        let descriptor = &filter.descriptor;
        let raw = filter.raw_value.as_str();
        let attribute = self.attribute(&descriptor.attribute_name)?;

        let predicate = match descriptor.operator {
            FilterOp::Equals => {
                if raw.eq_ignore_ascii_case(NULL_LITERAL) {
                    Predicate::IsNull { attribute }
                } else if raw.eq_ignore_ascii_case(NOT_NULL_LITERAL) {
                    Predicate::IsNotNull { attribute }
                } else {
                    let value = coerce(raw, &attribute.value_type)?;
                    Predicate::Equals { attribute, value }
                }
            }
            FilterOp::Like => {
                if !attribute.value_type.is_scalar() {
                    return Err(FilterError::NotScalar(attribute.path));
                }
                Predicate::like(attribute, raw)
            }
            FilterOp::GreaterThan | FilterOp::LessThan => {
                let value = coerce(raw, &attribute.value_type)?;
                let bound = if descriptor.operator == FilterOp::GreaterThan {
                    RangeBound::GreaterThan
                } else {
                    RangeBound::LessThan
                };
                Predicate::Range {
                    attribute,
                    bound,
                    value,
                }
            }
            FilterOp::In => {
                let values = split_list(raw)
                    .into_iter()
                    .map(|part| coerce(part, &attribute.value_type))
                    .collect::<Result<Vec<Value>, _>>()?;
                Predicate::In { attribute, values }
            }
            FilterOp::Between => {
                let parts = split_list(raw);
                let [low, high] = parts.as_slice() else {
                    tracing::warn!(
                        param = %descriptor.param_name,
                        value = %raw,
                        parts = parts.len(),
                        "Between filter needs exactly two comma-separated values, skipping"
                    );
                    return Ok(None);
                };
                Predicate::Between {
                    low: coerce(low, &attribute.value_type)?,
                    high: coerce(high, &attribute.value_type)?,
                    attribute,
                }
            }
            FilterOp::IsNull => Predicate::IsNull { attribute },
            FilterOp::IsNotNull => Predicate::IsNotNull { attribute },
        };

        Ok(Some(predicate))
    }
}
