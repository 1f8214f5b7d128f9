//! Database models for the content hierarchy and per-user ledgers
//!
//! Entity models ported from Kavita's `API/Entities/` to Rust with sqlx.
//!
//! # SQLite Adaptations
//! - Enums stored as integers
//! - DateTime stored as TEXT in ISO 8601 format
//! - Cover images stored as BLOBs
//! - The content tree (Library -> Series -> Volume -> Chapter -> MangaFile)
//!   is parent-owned: each child row carries its parent's id, no
//!   bidirectional linkage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// File format of an on-disk artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum MangaFormat {
    Unknown = 0,
    Image = 1,
    Archive = 2,
    Epub = 3,
    Pdf = 4,
}

impl MangaFormat {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => MangaFormat::Image,
            2 => MangaFormat::Archive,
            3 => MangaFormat::Epub,
            4 => MangaFormat::Pdf,
            _ => MangaFormat::Unknown,
        }
    }
}

/// Page-turn direction of the reader
/// Maps to C# `ReaderMode` enum in ReaderMode.cs
///
/// `Webtoon` was removed as a reader mode in favor of `LayoutMode::Webtoon`;
/// existing rows are reclassified by the manual migration in
/// `manual_migrations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ReaderMode {
    LeftRight = 0,
    UpDown = 1,
    /// Deprecated; retained only so old rows can be decoded and migrated
    Webtoon = 2,
}

impl ReaderMode {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => ReaderMode::UpDown,
            2 => ReaderMode::Webtoon,
            _ => ReaderMode::LeftRight,
        }
    }
}

/// Page layout of the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum LayoutMode {
    Single = 0,
    Double = 1,
    Webtoon = 2,
}

impl LayoutMode {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => LayoutMode::Double,
            2 => LayoutMode::Webtoon,
            _ => LayoutMode::Single,
        }
    }
}

// ============================================================================
// CONTENT HIERARCHY ENTITIES
// ============================================================================

/// Library - a top-level content root owning zero or more series
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Library {
    pub library_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Series - a logical work within a library
/// Maps to C# `Series` class in Series.cs
///
/// `name`, `original_name`, and `localized_name` are all search targets;
/// `sort_name` is the default ordering key. `pages` is the sum of all
/// descendant chapters' page counts, maintained by the scanner - this crate
/// only reads it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Series {
    pub series_id: i64,
    pub library_id: i64,
    pub name: String,
    pub original_name: String,
    pub localized_name: String,
    pub sort_name: String,
    pub pages: i32,
    #[sqlx(default)]
    #[serde(skip_serializing)]
    pub cover_image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Volume - belongs to exactly one series, ordered by `number`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Volume {
    pub volume_id: i64,
    pub series_id: i64,
    pub number: i32,
    #[sqlx(default)]
    #[serde(skip_serializing)]
    pub cover_image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

/// Chapter - the leaf reading unit, belongs to exactly one volume
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: i64,
    pub volume_id: i64,
    pub number: i32,
    pub pages: i32,
    pub created_at: DateTime<Utc>,
}

/// MangaFile - an on-disk artifact backing a chapter
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MangaFile {
    pub file_id: i64,
    pub chapter_id: i64,
    pub file_path: String,
    pub format: i32, // MangaFormat enum
    pub pages: i32,
}

impl MangaFile {
    pub fn get_format(&self) -> MangaFormat {
        MangaFormat::from_i32(self.format)
    }
}

// ============================================================================
// PER-USER LEDGER ENTITIES
// ============================================================================

/// Reading progress for one (user, chapter) pair
/// Maps to C# `AppUserProgress` class
///
/// Carries denormalized volume/series ids so enrichment can bulk-sum at any
/// level of the hierarchy without re-walking the tree.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AppUserProgress {
    pub progress_id: i64,
    pub app_user_id: i64,
    pub chapter_id: i64,
    pub volume_id: i64,
    pub series_id: i64,
    pub pages_read: i32,
    pub last_modified: DateTime<Utc>,
}

/// Rating and review for one (user, series) pair
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AppUserRating {
    pub app_user_id: i64,
    pub series_id: i64,
    pub rating: f32,
    #[sqlx(default)]
    pub review: Option<String>,
}

/// Reader display settings per user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AppUserPreferences {
    pub app_user_id: i64,
    pub reader_mode: i32, // ReaderMode enum
    pub layout_mode: i32, // LayoutMode enum
}

impl AppUserPreferences {
    pub fn get_reader_mode(&self) -> ReaderMode {
        ReaderMode::from_i32(self.reader_mode)
    }

    pub fn get_layout_mode(&self) -> LayoutMode {
        LayoutMode::from_i32(self.layout_mode)
    }
}

/// One row of the append-only manual migration ledger
/// Maps to C# `ManualMigrationHistory` entity
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ManualMigrationRecord {
    pub id: i64,
    pub name: String,
    pub product_version: String,
    pub ran_at: DateTime<Utc>,
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New library record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLibrary {
    pub name: String,
}

impl NewLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// New series record for insertion
///
/// The scanner seeds original/localized/sort names from the display name
/// when the source provides nothing better; `new` mirrors that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeries {
    pub library_id: i64,
    pub name: String,
    pub original_name: String,
    pub localized_name: String,
    pub sort_name: String,
    pub pages: i32,
    pub cover_image: Option<Vec<u8>>,
}

impl NewSeries {
    pub fn new(library_id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            library_id,
            original_name: name.clone(),
            localized_name: name.clone(),
            sort_name: name.clone(),
            name,
            pages: 0,
            cover_image: None,
        }
    }
}

/// New volume record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVolume {
    pub series_id: i64,
    pub number: i32,
    pub cover_image: Option<Vec<u8>>,
}

impl NewVolume {
    pub fn new(series_id: i64, number: i32) -> Self {
        Self {
            series_id,
            number,
            cover_image: None,
        }
    }
}

/// New chapter record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChapter {
    pub volume_id: i64,
    pub number: i32,
    pub pages: i32,
}

impl NewChapter {
    pub fn new(volume_id: i64, number: i32, pages: i32) -> Self {
        Self {
            volume_id,
            number,
            pages,
        }
    }
}

/// New file record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMangaFile {
    pub chapter_id: i64,
    pub file_path: String,
    pub format: i32,
    pub pages: i32,
}

impl NewMangaFile {
    pub fn new(chapter_id: i64, file_path: impl Into<String>) -> Self {
        Self {
            chapter_id,
            file_path: file_path.into(),
            format: MangaFormat::Archive as i32,
            pages: 0,
        }
    }
}

/// Progress write for the upsert path; identifies the full chapter lineage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProgress {
    pub app_user_id: i64,
    pub chapter_id: i64,
    pub volume_id: i64,
    pub series_id: i64,
    pub pages_read: i32,
}
