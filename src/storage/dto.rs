//! Display DTOs for the query layer
//!
//! Projections of the content hierarchy returned to the API layer, ported
//! from Kavita's `API/DTOs/`. The overlay fields (`pages_read`,
//! `user_rating`, `user_review`) belong to the per-user ledgers, not the
//! content tree; they are filled by a separate enrichment pass after
//! retrieval and default to zero/empty when a query does not enrich (see
//! `storage::enrichment`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Series projected for display, with room for the per-user overlay
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeriesDto {
    pub id: i64,
    pub library_id: i64,
    pub name: String,
    pub original_name: String,
    pub localized_name: String,
    pub sort_name: String,
    /// Total pages across all descendant chapters (scanner-maintained)
    pub pages: i32,
    pub created: DateTime<Utc>,

    // Per-user overlay, filled by enrichment
    #[sqlx(default)]
    pub pages_read: i32,
    #[sqlx(default)]
    pub user_rating: f32,
    #[sqlx(default)]
    pub user_review: Option<String>,
}

/// Volume projected for display with its nested chapters
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VolumeDto {
    pub id: i64,
    pub series_id: i64,
    pub number: i32,

    /// Pages read at the volume level. Summed from progress rows keyed by
    /// this volume's id directly, never re-derived from the chapter sums -
    /// the two levels are stored independently in the ledger.
    #[sqlx(default)]
    pub pages_read: i32,

    #[sqlx(skip)]
    pub chapters: Vec<ChapterDto>,
}

/// Chapter projected for display
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChapterDto {
    pub id: i64,
    pub volume_id: i64,
    pub number: i32,
    pub pages: i32,

    #[sqlx(default)]
    pub pages_read: i32,

    /// Backing files; populated only by single-volume retrieval
    #[sqlx(skip)]
    pub files: Vec<MangaFileDto>,
}

/// File projected for display
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MangaFileDto {
    pub id: i64,
    pub file_path: String,
    pub format: i32,
    pub pages: i32,
}

/// Series search hit, including the owning library's name
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SearchResultDto {
    pub series_id: i64,
    pub name: String,
    pub original_name: String,
    pub localized_name: String,
    pub sort_name: String,
    pub library_id: i64,
    pub library_name: String,
}
