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


//! Content hierarchy queries and reading progress aggregation
//!
//! This crate is the data layer of a personal comic/manga library server,
//! ported from Kavita's C# repository layer to Rust with sqlx. It owns:
//!
//! - The Library -> Series -> Volume -> Chapter -> File content hierarchy
//! - Per-user reading progress and rating ledgers, overlaid onto content
//!   DTOs in a batch enrichment pass (no per-item queries)
//! - Paginated, searchable, and ranked views over the hierarchy
//!   ("recently added", "in progress")
//! - Guarded run-once manual migrations tracked in a history ledger
//!
//! Out of scope: the on-disk scanner that populates the hierarchy, the HTTP
//! API layer that consumes this crate, image caching, and authentication.
//!
//! # Usage Example
//! ```no_run
//! use tankobon_core::pagination::PagingParams;
//! use tankobon_core::storage::{queries, Database, NewLibrary, NewSeries};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./library.db").await?;
//!
//! let library_id = queries::insert_library(db.pool(), &NewLibrary::new("Manga")).await?;
//! let series_id =
//!     queries::insert_series(db.pool(), &NewSeries::new(library_id, "Solo Leveling")).await?;
//!
//! // Paginated, progress-enriched listing for user 1
//! let page = queries::get_series_dto_for_library(
//!     db.pool(),
//!     library_id,
//!     1,
//!     &PagingParams::new(1, 30),
//! )
//! .await?;
//! println!("{} series, {} pages", page.total_count, page.total_pages);
//! # let _ = series_id;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hashing;
pub mod pagination;
pub mod storage;

pub use error::{Result, TankobonError};
pub use pagination::{PagedList, PagingParams};
