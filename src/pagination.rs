// Tankobon - Personal Comic & Manga Library Server
// Copyright (C) 2026 Tankobon Contributors
//
// This program is a Rust port of Kavita (https://github.com/Kareadita/Kavita)
// Original work Copyright (C) Kavita contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Pagination engine
//!
//! Ported from Kavita's `Helpers/PagedList.cs` and `Helpers/UserParams.cs`.
//! A paginated query produces a bounded slice of an ordered result set plus
//! metadata: total item count, total pages, and the current page.
//!
//! Malformed paging input is normalized, never rejected: page numbers below 1
//! become 1, page sizes below 1 become the default, and page sizes above the
//! maximum are clamped. Requesting a page past the end yields an empty slice.
//!
//! The count and the slice for one page must be evaluated against the same
//! filtered predicate on a single snapshot; the query layer runs both inside
//! one read transaction (see `storage::queries`).

use serde::{Deserialize, Serialize};

/// Page size applied when the caller supplies none (or a non-positive one)
pub const DEFAULT_PAGE_SIZE: i32 = 30;

/// Upper bound on the page size a caller may request
pub const MAX_PAGE_SIZE: i32 = 50;

/// Normalized paging parameters (1-based page number)
/// Maps to C# `UserParams` class in UserParams.cs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingParams {
    page_number: i32,
    page_size: i32,
}

impl PagingParams {
    /// Create paging parameters, normalizing out-of-range input
    pub fn new(page_number: i32, page_size: i32) -> Self {
        let page_number = page_number.max(1);
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            page_number,
            page_size,
        }
    }

    pub fn page_number(&self) -> i32 {
        self.page_number
    }

    pub fn page_size(&self) -> i32 {
        self.page_size
    }

    /// Number of items to skip: (page - 1) * size
    pub fn offset(&self) -> i64 {
        (self.page_number as i64 - 1) * self.page_size as i64
    }

    /// Number of items to take
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PagingParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus pagination metadata
/// Maps to C# `PagedList<T>` class in PagedList.cs
#[derive(Debug, Clone, Serialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    /// 1-based page number as requested (after normalization)
    pub current_page: i32,
    pub page_size: i32,
    /// ceil(total_count / page_size), floored at 1
    pub total_pages: i32,
    /// Count of the full filtered set before slicing
    pub total_count: i64,
}

impl<T> PagedList<T> {
    /// Assemble a page from an already-sliced item set and the total count
    /// of the filtered set it was sliced from.
    pub fn new(items: Vec<T>, total_count: i64, params: &PagingParams) -> Self {
        let page_size = params.page_size();
        let total_pages = ((total_count + page_size as i64 - 1) / page_size as i64).max(1) as i32;
        Self {
            items,
            current_page: params.page_number(),
            page_size,
            total_pages,
            total_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
