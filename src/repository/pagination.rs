//! Pagination and sorting parameters.

use serde::{Deserialize, Serialize};

use crate::error::{RepositoryError, Result};
use crate::repository::{Entity, ValidationError, ValidationErrorKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

// == Pagination ==
/// Page request: 1-based `page`, `limit` items per page, optional sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Pagination {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }

    /// Same page request sorted by `field`.
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    /// Rejects `page == 0` and `limit == 0`.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.page == 0 {
            errors.push(
                ValidationError::new(ValidationErrorKind::OutOfRange, "Page must be at least 1")
                    .field("page"),
            );
        }
        if self.limit == 0 {
            errors.push(
                ValidationError::new(ValidationErrorKind::OutOfRange, "Limit must be at least 1")
                    .field("limit"),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::validation(errors))
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Items `[offset, offset + limit)`; empty past the end.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset())
            .take(self.limit)
            .cloned()
            .collect()
    }

    /// Sorts in place when `sort_by` is set.
    pub fn sort<E: Entity>(&self, items: &mut [E]) {
        if let Some(field) = &self.sort_by {
            sort_entities(items, field, self.sort_order);
        }
    }
}

/// Stable sort by a named field. Missing or mismatched values compare equal.
pub fn sort_entities<E: Entity>(items: &mut [E], field: &str, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = match (a.value_of(field), b.value_of(field)) {
            (Some(x), Some(y)) => x.compare(&y),
            _ => std::cmp::Ordering::Equal,
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

// == Page Info ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of results plus its position in the whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}
