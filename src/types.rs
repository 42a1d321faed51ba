//! Core types shared across the library

use serde::{Deserialize, Serialize};

/// Amount of money (base currency unless stated otherwise)
pub type Amount = f64;

/// Units of a product
pub type Quantity = u32;

/// Record identifiers as issued by the data API
pub type RecordId = String;

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Number of pages of `limit` items needed for `total`
    pub fn page_count(&self, limit: usize) -> usize {
        if limit == 0 {
            0
        } else {
            self.total.div_ceil(limit)
        }
    }
}

/// Pagination request; pages are 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Slice `items` down to this page
    pub fn apply<T: Clone>(&self, items: &[T]) -> Page<T> {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        Page::new(items[start..end].to_vec(), items.len())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}
