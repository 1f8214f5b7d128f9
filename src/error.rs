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


//! Error types for the library core
//!
//! Errors are categorized by domain using thiserror. Store errors from sqlx
//! are surfaced unmodified to the caller via `#[from]`; retry policy belongs
//! to the caller, not this crate.
//!
//! A single-entity lookup that finds nothing is a `NotFound` error. A list
//! operation that finds nothing is a success with an empty collection, never
//! an error.

use thiserror::Error;

/// Result type alias using our TankobonError type
pub type Result<T> = std::result::Result<T, TankobonError>;

/// Main error type for the library core
#[derive(Error, Debug)]
pub enum TankobonError {
    /// A lookup by id expected exactly one row and found none
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The underlying store could not complete the operation
    /// (connectivity, constraint violation, timeout)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema or manual migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Filesystem error outside of sqlx (database directory, streams)
    #[error("File I/O error: {0}")]
    FileIo(String),

    /// Operation is not valid for the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl TankobonError {
    /// True if this error is a single-entity NotFound condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, TankobonError::NotFound { .. })
    }
}
