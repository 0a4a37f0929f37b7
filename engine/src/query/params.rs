//! Request parameter resolution
//!
//! Reads pagination, sort, search and filter values from the flat request
//! parameter map, applying the binding's defaults and clamps. Nothing here
//! fails: missing or unparsable values fall back to defaults.

use std::collections::HashMap;

use super::binding::{BindingConfig, SortDirection};
use crate::core::constants::{
    DEFAULT_PAGE, PARAM_DIRECTION, PARAM_PAGE, PARAM_SEARCH, PARAM_SIZE, PARAM_SORT,
};
use crate::schema::AttributeDescriptor;
use crate::utils::string::non_blank;

/// Flat map of query-parameter name to raw value
pub type RawParams = HashMap<String, String>;

/// A filter whose request parameter was present and non-blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub descriptor: AttributeDescriptor,
    pub raw_value: String,
}

/// Per-invocation view of the request, derived from raw parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub page: u32,
    pub size: u32,
    pub sort_field: String,
    pub direction: SortDirection,
    pub search_term: Option<String>,
    /// Active filters in discovery order
    pub active_filters: Vec<ActiveFilter>,
}

impl ResolvedRequest {
    /// Row offset of the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// Parse an integer parameter, `None` when missing, blank or unparsable
fn parse_int_param(params: &RawParams, name: &str) -> Option<i32> {
    non_blank(params.get(name)).and_then(|v| v.parse::<i32>().ok())
}

/// Resolve raw request parameters against a binding and its filter descriptors
pub fn resolve(
    params: &RawParams,
    config: &BindingConfig,
    descriptors: &[AttributeDescriptor],
) -> ResolvedRequest {
    let page = parse_int_param(params, PARAM_PAGE)
        .map(|p| p.max(0).unsigned_abs())
        .unwrap_or(DEFAULT_PAGE);

    let max_size = config.max_page_size.max(1);
    let size = parse_int_param(params, PARAM_SIZE)
        .map(|s| s.max(1).unsigned_abs())
        .unwrap_or(config.default_page_size)
        .clamp(1, max_size);

    let sort_field = non_blank(params.get(PARAM_SORT))
        .unwrap_or(&config.default_sort)
        .to_string();

    let direction = non_blank(params.get(PARAM_DIRECTION))
        .map(SortDirection::from_param)
        .unwrap_or(config.default_direction);

    let search_term = non_blank(params.get(PARAM_SEARCH)).map(str::to_string);

    let active_filters = descriptors
        .iter()
        .filter_map(|descriptor| {
            non_blank(params.get(&descriptor.param_name)).map(|raw| ActiveFilter {
                descriptor: descriptor.clone(),
                raw_value: raw.to_string(),
            })
        })
        .collect();

    ResolvedRequest {
        page,
        size,
        sort_field,
        direction,
        search_term,
        active_filters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FilterOp, ValueType};

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn descriptor(param: &str, op: FilterOp) -> AttributeDescriptor {
        AttributeDescriptor {
            attribute_name: param.to_string(),
            param_name: param.to_string(),
            value_type: ValueType::String,
            operator: op,
        }
    }

    fn config() -> BindingConfig {
        BindingConfig::new("User")
            .page_sizes(20, 100)
            .sort("id", SortDirection::Asc)
    }

    #[test]
    fn test_defaults_when_empty() {
        let resolved = resolve(&RawParams::new(), &config(), &[]);

        assert_eq!(resolved.page, 0);
        assert_eq!(resolved.size, 20);
        assert_eq!(resolved.sort_field, "id");
        assert_eq!(resolved.direction, SortDirection::Asc);
        assert_eq!(resolved.search_term, None);
        assert!(resolved.active_filters.is_empty());
    }

    #[test]
    fn test_negative_page_clamps_to_zero() {
        for raw in ["-1", "-100", "-2147483648"] {
            let resolved = resolve(&params(&[("page", raw)]), &config(), &[]);
            assert_eq!(resolved.page, 0, "page={}", raw);
        }
    }

    #[test]
    fn test_unparsable_page_defaults() {
        let resolved = resolve(&params(&[("page", "two")]), &config(), &[]);
        assert_eq!(resolved.page, 0);
    }

    #[test]
    fn test_size_clamped_into_range() {
        let cases = [("0", 1), ("-5", 1), ("1", 1), ("100", 100), ("101", 100), ("5000", 100)];
        for (raw, expected) in cases {
            let resolved = resolve(&params(&[("size", raw)]), &config(), &[]);
            assert_eq!(resolved.size, expected, "size={}", raw);
        }
    }

    #[test]
    fn test_unparsable_size_defaults() {
        let resolved = resolve(&params(&[("size", "lots")]), &config(), &[]);
        assert_eq!(resolved.size, 20);

        let resolved = resolve(&params(&[("size", "99999999999")]), &config(), &[]);
        assert_eq!(resolved.size, 20);
    }

    #[test]
    fn test_blank_sort_and_direction_use_defaults() {
        let config = config().sort("created_at", SortDirection::Desc);
        let resolved = resolve(&params(&[("sort", " "), ("direction", "")]), &config, &[]);

        assert_eq!(resolved.sort_field, "created_at");
        assert_eq!(resolved.direction, SortDirection::Desc);
    }

    #[test]
    fn test_direction_parsing() {
        let resolved = resolve(&params(&[("direction", "DESC")]), &config(), &[]);
        assert_eq!(resolved.direction, SortDirection::Desc);

        let config = config().sort("id", SortDirection::Desc);
        let resolved = resolve(&params(&[("direction", "up")]), &config, &[]);
        assert_eq!(resolved.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_is_not_validated_here() {
        let resolved = resolve(&params(&[("sort", "no_such_field")]), &config(), &[]);
        assert_eq!(resolved.sort_field, "no_such_field");
    }

    #[test]
    fn test_blank_search_is_absent() {
        let resolved = resolve(&params(&[("search", "   ")]), &config(), &[]);
        assert_eq!(resolved.search_term, None);

        let resolved = resolve(&params(&[("search", " jo ")]), &config(), &[]);
        assert_eq!(resolved.search_term.as_deref(), Some(" jo "));
    }

    #[test]
    fn test_active_filters_follow_discovery_order() {
        let descriptors = vec![
            descriptor("status", FilterOp::In),
            descriptor("name", FilterOp::Like),
            descriptor("email", FilterOp::Equals),
        ];
        let raw = params(&[("name", "jo"), ("status", "active"), ("email", " "), ("other", "x")]);
        let resolved = resolve(&raw, &config(), &descriptors);

        let active: Vec<(&str, &str)> = resolved
            .active_filters
            .iter()
            .map(|f| (f.descriptor.param_name.as_str(), f.raw_value.as_str()))
            .collect();
        assert_eq!(active, vec![("status", "active"), ("name", "jo")]);
    }

    #[test]
    fn test_offset() {
        let resolved = resolve(&params(&[("page", "3"), ("size", "25")]), &config(), &[]);
        assert_eq!(resolved.offset(), 75);
    }
}
