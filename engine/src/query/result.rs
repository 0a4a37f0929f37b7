//! Result page returned to the caller

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::binding::SortDirection;

/// One page of query results plus the metadata needed to render pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage<T> {
    pub content: Vec<T>,
    /// Zero-based page number
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub sort_field: String,
    pub direction: SortDirection,
    /// `search` plus one entry per active filter parameter, in resolution order
    pub active_filters: IndexMap<String, String>,
}

/// Number of pages needed for `total_elements` rows; 0 when there are none
pub fn total_pages(total_elements: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total_elements.div_ceil(u64::from(size))
}

impl<T> ResultPage<T> {
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of elements on this page
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Transform the content while keeping the page metadata
    pub fn map<U, F>(self, f: F) -> ResultPage<U>
    where
        F: FnMut(T) -> U,
    {
        ResultPage {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            sort_field: self.sort_field,
            direction: self.direction,
            active_filters: self.active_filters,
        }
    }
}

impl<T> fmt::Display for ResultPage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page={}/{}, size={}, total={}, sort={} {}, filters={:?}",
            self.page,
            self.total_pages,
            self.content.len(),
            self.total_elements,
            self.sort_field,
            self.direction,
            self.active_filters
        )
    }
}
