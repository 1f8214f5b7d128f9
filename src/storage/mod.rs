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


//! Database storage, models, and queries
//!
//! This module handles all database operations using SQLite. It ports
//! Kavita's Entity Framework data layer (`API/Data/`) to Rust with sqlx.
//!
//! # Reference C# Sources
//! - `API/Entities/` - Entity models (Library, Series, Volume, Chapter, ...)
//! - `API/Data/SeriesRepository.cs` - Hierarchy queries and enrichment
//! - `API/Data/ManualMigrations/` - Guarded run-once data migrations
//!
//! # Database Schema
//! - Libraries / Series / Volumes / Chapters / MangaFiles: the strict
//!   ownership tree of content, cascading on delete
//! - AppUserProgresses / AppUserRatings: the per-user ledgers, an
//!   independent aggregate joined against content on demand (no cascade)
//! - AppUserPreferences: per-user reader display settings
//! - ManualMigrationHistory: append-only run-once migration ledger
//!
//! # Usage Example
//! ```no_run
//! use tankobon_core::storage::{queries, Database, NewLibrary};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./library.db").await?;
//! let library_id = queries::insert_library(db.pool(), &NewLibrary::new("Manga")).await?;
//! let results = queries::search_series(db.pool(), &[library_id], "leveling").await?;
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod dto;
pub mod enrichment;
pub mod manual_migrations;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use dto::{ChapterDto, MangaFileDto, SearchResultDto, SeriesDto, VolumeDto};
pub use manual_migrations::MigrationContext;
pub use models::{
    AppUserPreferences, AppUserProgress, AppUserRating, Chapter, LayoutMode, Library,
    MangaFile, MangaFormat, ManualMigrationRecord, NewChapter, NewLibrary, NewMangaFile,
    NewProgress, NewSeries, NewVolume, ReaderMode, Series, Volume,
};
