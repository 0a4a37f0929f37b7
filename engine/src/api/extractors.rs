//! Request parameter extractor

use std::ops::Deref;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use super::types::ApiError;
use crate::query::RawParams;

/// Flat query-parameter map for a binding.
///
/// For repeated keys the first occurrence wins. A query string that cannot be
/// decoded is rejected with 400 Bad Request.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(pub RawParams);

impl Deref for QueryParams {
    type Target = RawParams;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| ApiError::bad_request("QUERY_PARSE_ERROR", rejection.body_text()))?;

        let mut params = RawParams::with_capacity(pairs.len());
        for (key, value) in pairs {
            params.entry(key).or_insert(value);
        }
        Ok(Self(params))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(uri: &str) -> QueryParams {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        QueryParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_extracts_flat_map() {
        let params = extract("/users?page=1&size=5&search=jo").await;
        assert_eq!(params.get("page").map(String::as_str), Some("1"));
        assert_eq!(params.get("size").map(String::as_str), Some("5"));
        assert_eq!(params.get("search").map(String::as_str), Some("jo"));
        assert_eq!(params.len(), 3);
    }

    #[tokio::test]
    async fn test_first_occurrence_wins() {
        let params = extract("/users?status=active&status=pending").await;
        assert_eq!(params.get("status").map(String::as_str), Some("active"));
    }

    #[tokio::test]
    async fn test_decodes_values() {
        let params = extract("/users?status=active%2Cpending&name=John+Smith").await;
        assert_eq!(params.get("status").map(String::as_str), Some("active,pending"));
        assert_eq!(params.get("name").map(String::as_str), Some("John Smith"));
    }

    #[tokio::test]
    async fn test_blank_value_is_kept() {
        let params = extract("/users?search=").await;
        assert_eq!(params.get("search").map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn test_no_query_string() {
        let params = extract("/users").await;
        assert!(params.is_empty());
    }
}
