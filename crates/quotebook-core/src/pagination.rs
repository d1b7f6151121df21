//! Offset/limit windows over list queries.

use serde::{Deserialize, Serialize};

use crate::error::{QuotebookError, Result};

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 50;

/// A requested window: at most `limit` rows starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Build a request from optional query parameters using the standard limits.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self::with_limits(limit, offset, DEFAULT_LIMIT, MAX_LIMIT)
    }

    /// Build a request with explicit default and maximum limits.
    ///
    /// The limit is clamped to `1..=max_limit`.
    pub fn with_limits(
        limit: Option<u64>,
        offset: Option<u64>,
        default_limit: u64,
        max_limit: u64,
    ) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
            offset: offset.unwrap_or(0),
        }
    }

    /// Fail with `PageNotFound` when the window starts past the end of the
    /// collection. The first page of an empty collection is valid.
    pub fn ensure_in_range(&self, total: u64) -> Result<()> {
        if self.offset >= total && (total != 0 || self.offset != 0) {
            return Err(QuotebookError::PageNotFound);
        }
        Ok(())
    }

    /// The window after this one, if any rows remain beyond it.
    pub fn next(&self, total: u64) -> Option<PageRequest> {
        let next_offset = self.offset.saturating_add(self.limit);
        (next_offset < total).then_some(PageRequest {
            limit: self.limit,
            offset: next_offset,
        })
    }
}

/// One window of a list query plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn next(&self) -> Option<PageRequest> {
        self.request.next(self.total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
