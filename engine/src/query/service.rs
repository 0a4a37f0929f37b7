//! Query binding service
//!
//! Orchestrates one binding invocation: discover filter descriptors, resolve
//! the request, build the predicate, then count and fetch one page from the
//! store. Shared state is read-only, so one service can serve any number of
//! concurrent requests.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::binding::{BindingConfig, BindingRegistry};
use super::builder::PredicateBuilder;
use super::error::QueryBindError;
use super::params::{RawParams, ResolvedRequest, resolve};
use super::predicate::Predicate;
use super::result::{ResultPage, total_pages};
use crate::core::constants::PARAM_SEARCH;
use crate::data::{DataQuery, QueryableStore, SortOrder};
use crate::schema::SchemaRegistry;

/// Everything needed to query the store, computed without touching it
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub entity: String,
    pub request: ResolvedRequest,
    /// `None` means unfiltered
    pub predicate: Option<Predicate>,
    /// `None` when the sort field does not resolve to a scalar attribute
    pub order: Option<SortOrder>,
}

impl PreparedQuery {
    fn data_query(&self) -> DataQuery<'_> {
        DataQuery {
            predicate: self.predicate.as_ref(),
            order: self.order.as_ref(),
            offset: self.request.offset(),
            limit: self.request.size,
        }
    }

    /// `search` first, then each active filter parameter in resolution order
    pub fn active_filters(&self) -> IndexMap<String, String> {
        let mut display = IndexMap::with_capacity(self.request.active_filters.len() + 1);
        if let Some(term) = &self.request.search_term {
            display.insert(PARAM_SEARCH.to_string(), term.clone());
        }
        for filter in &self.request.active_filters {
            display.insert(
                filter.descriptor.param_name.clone(),
                filter.raw_value.clone(),
            );
        }
        display
    }
}

impl fmt::Display for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {}", self.entity)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        if let Some(order) = &self.order {
            write!(
                f,
                " ORDER BY {} {}",
                order.attribute.path,
                order.direction.as_str().to_uppercase()
            )?;
        }
        write!(
            f,
            " LIMIT {} OFFSET {}",
            self.request.size,
            self.request.offset()
        )
    }
}

/// Executes bindings against a schema registry
#[derive(Debug, Clone)]
pub struct QueryBindService {
    schemas: Arc<SchemaRegistry>,
    bindings: Arc<BindingRegistry>,
}

impl QueryBindService {
    pub fn new(schemas: Arc<SchemaRegistry>, bindings: Arc<BindingRegistry>) -> Self {
        Self { schemas, bindings }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// Resolve parameters and build the predicate and ordering
    pub fn prepare(
        &self,
        config: &BindingConfig,
        params: &RawParams,
    ) -> Result<PreparedQuery, QueryBindError> {
        config.check()?;
        let entity = config.entity.as_str();
        let descriptors = self
            .schemas
            .discover(entity)
            .map_err(|_| QueryBindError::UnknownEntity(entity.to_string()))?;

        let request = resolve(params, config, &descriptors);
        let predicate = PredicateBuilder::new(&self.schemas, entity).build(
            &config.search_attributes,
            request.search_term.as_deref(),
            &request.active_filters,
        );
        let order = self.sort_order(entity, &request);

        Ok(PreparedQuery {
            entity: entity.to_string(),
            request,
            predicate,
            order,
        })
    }

    fn sort_order(&self, entity: &str, request: &ResolvedRequest) -> Option<SortOrder> {
        match self.schemas.resolve_path(entity, &request.sort_field) {
            Ok(resolved) if resolved.value_type.is_scalar() => Some(SortOrder {
                attribute: resolved.into(),
                direction: request.direction,
            }),
            Ok(resolved) => {
                tracing::warn!(
                    sort = %request.sort_field,
                    value_type = %resolved.value_type,
                    "Sort field is not a scalar attribute, ignoring order"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    sort = %request.sort_field,
                    error = %e,
                    "Invalid sort field, ignoring order"
                );
                None
            }
        }
    }

    /// Execute a binding and return one page of results
    pub async fn execute<T, S>(
        &self,
        config: &BindingConfig,
        params: &RawParams,
        store: &S,
    ) -> Result<ResultPage<T>, QueryBindError>
    where
        T: Send,
        S: QueryableStore<T> + ?Sized,
    {
        let prepared = self.prepare(config, params)?;
        let entity = prepared.entity.as_str();

        let (total_elements, content) = tokio::try_join!(
            store.count(entity, prepared.predicate.as_ref()),
            store.query(entity, prepared.data_query()),
        )
        .map_err(|e| QueryBindError::store(entity, e))?;

        let request = &prepared.request;
        let page = ResultPage {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_pages(total_elements, request.size),
            sort_field: request.sort_field.clone(),
            direction: request.direction,
            active_filters: prepared.active_filters(),
        };

        tracing::debug!(
            entity,
            page = page.page,
            total_pages = page.total_pages,
            size = page.size,
            total = page.total_elements,
            sort = %page.sort_field,
            direction = %page.direction,
            filters = ?page.active_filters,
            "Executed query binding"
        );

        Ok(page)
    }

    /// Execute the binding registered for `endpoint`
    pub async fn execute_endpoint<T, S>(
        &self,
        endpoint: &str,
        params: &RawParams,
        store: &S,
    ) -> Result<ResultPage<T>, QueryBindError>
    where
        T: Send,
        S: QueryableStore<T> + ?Sized,
    {
        let config = self.bindings.get(endpoint)?;
        self.execute(config, params, store).await
    }
}
