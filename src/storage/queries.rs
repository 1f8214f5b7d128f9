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


//! Query layer over the content hierarchy
//!
//! Repository-pattern functions ported from Kavita's
//! `API/Data/SeriesRepository.cs`. Retrieval composes three stages, always
//! in this order: filtered/ordered read, optional pagination, then the
//! per-user enrichment pass from `storage::enrichment`.
//!
//! # Query Patterns
//! - Free async functions over `&SqlitePool`
//! - List results ordered by `sort_name` ascending unless stated otherwise
//! - Single-entity id lookups that find nothing return `NotFound`; list
//!   operations return empty collections
//! - Paginated count+slice pairs run inside one transaction so both see the
//!   same WAL snapshot

use crate::error::{Result, TankobonError};
use crate::pagination::{PagedList, PagingParams};
use crate::storage::dto::{ChapterDto, MangaFileDto, SearchResultDto, SeriesDto, VolumeDto};
use crate::storage::enrichment::{add_series_modifiers, add_volume_modifiers};
use crate::storage::models::*;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::time::Instant;

/// Column list projecting a Series row into a SeriesDto
const SERIES_DTO_COLUMNS: &str =
    "series_id AS id, library_id, name, original_name, localized_name, sort_name, pages, created_at AS created";

/// Build a "?, ?, ..." placeholder list for an IN clause
pub(crate) fn sql_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// ============================================================================
// SERIES QUERIES
// ============================================================================

/// Insert a new library
///
/// Returns the library_id of the inserted row.
pub async fn insert_library(pool: &SqlitePool, library: &NewLibrary) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Libraries (name) VALUES (?)")
        .bind(&library.name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Insert a new series
pub async fn insert_series(pool: &SqlitePool, series: &NewSeries) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO Series (
            library_id, name, original_name, localized_name, sort_name, pages, cover_image
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(series.library_id)
    .bind(&series.name)
    .bind(&series.original_name)
    .bind(&series.localized_name)
    .bind(&series.sort_name)
    .bind(series.pages)
    .bind(&series.cover_image)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find series by id; a missing id is a NotFound error
pub async fn get_series_by_id(pool: &SqlitePool, series_id: i64) -> Result<Series> {
    let series = sqlx::query_as::<_, Series>("SELECT * FROM Series WHERE series_id = ?")
        .bind(series_id)
        .fetch_optional(pool)
        .await?;

    series.ok_or(TankobonError::NotFound {
        entity: "Series",
        id: series_id,
    })
}

/// Find series by exact name; absence is a valid empty result, not an error
pub async fn get_series_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Series>> {
    let series = sqlx::query_as::<_, Series>("SELECT * FROM Series WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(series)
}

/// List all series in a library as entities, ordered by sort name
pub async fn get_series_for_library(pool: &SqlitePool, library_id: i64) -> Result<Vec<Series>> {
    let series = sqlx::query_as::<_, Series>(
        "SELECT * FROM Series WHERE library_id = ? ORDER BY sort_name",
    )
    .bind(library_id)
    .fetch_all(pool)
    .await?;

    Ok(series)
}

/// One page of a library's series, enriched with the user's progress/ratings
///
/// Count and slice are evaluated in a single transaction so the metadata and
/// the items always describe the same snapshot of the library.
pub async fn get_series_dto_for_library(
    pool: &SqlitePool,
    library_id: i64,
    user_id: i64,
    params: &PagingParams,
) -> Result<PagedList<SeriesDto>> {
    let started = Instant::now();

    let mut tx = pool.begin().await?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Series WHERE library_id = ?")
        .bind(library_id)
        .fetch_one(&mut *tx)
        .await?;

    let mut items = sqlx::query_as::<_, SeriesDto>(&format!(
        "SELECT {SERIES_DTO_COLUMNS} FROM Series WHERE library_id = ? ORDER BY sort_name LIMIT ? OFFSET ?"
    ))
    .bind(library_id)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    add_series_modifiers(pool, user_id, &mut items).await?;

    tracing::debug!(
        library_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Processed get_series_dto_for_library"
    );

    Ok(PagedList::new(items, total_count, params))
}

/// Single series as a DTO, enriched with the user's progress and rating
pub async fn get_series_dto_by_id(
    pool: &SqlitePool,
    series_id: i64,
    user_id: i64,
) -> Result<SeriesDto> {
    let series = sqlx::query_as::<_, SeriesDto>(&format!(
        "SELECT {SERIES_DTO_COLUMNS} FROM Series WHERE series_id = ?"
    ))
    .bind(series_id)
    .fetch_optional(pool)
    .await?;

    let mut series = vec![series.ok_or(TankobonError::NotFound {
        entity: "Series",
        id: series_id,
    })?];

    add_series_modifiers(pool, user_id, &mut series).await?;

    Ok(series.remove(0))
}

/// Fuzzy multi-field series search within a set of allowed libraries
///
/// Matches the query as a case-insensitive substring of name, original name,
/// or localized name. An empty query matches every series in scope; an empty
/// library set matches nothing.
pub async fn search_series(
    pool: &SqlitePool,
    library_ids: &[i64],
    search_query: &str,
) -> Result<Vec<SearchResultDto>> {
    if library_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = sql_placeholders(library_ids.len());
    let sql = format!(
        r#"
        SELECT s.series_id, s.name, s.original_name, s.localized_name, s.sort_name,
               s.library_id, l.name AS library_name
        FROM Series s
        INNER JOIN Libraries l ON s.library_id = l.library_id
        WHERE s.library_id IN ({placeholders})
          AND (s.name LIKE ? OR s.original_name LIKE ? OR s.localized_name LIKE ?)
        ORDER BY s.sort_name
        "#
    );

    let pattern = format!("%{search_query}%");
    let mut query = sqlx::query_as::<_, SearchResultDto>(&sql);
    for id in library_ids {
        query = query.bind(id);
    }
    let results = query
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    Ok(results)
}

// ============================================================================
// VOLUME / CHAPTER QUERIES
// ============================================================================

/// Insert a new volume
pub async fn insert_volume(pool: &SqlitePool, volume: &NewVolume) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Volumes (series_id, number, cover_image) VALUES (?, ?, ?)")
        .bind(volume.series_id)
        .bind(volume.number)
        .bind(&volume.cover_image)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Insert a new chapter
pub async fn insert_chapter(pool: &SqlitePool, chapter: &NewChapter) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Chapters (volume_id, number, pages) VALUES (?, ?, ?)")
        .bind(chapter.volume_id)
        .bind(chapter.number)
        .bind(chapter.pages)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Insert a new file record
pub async fn insert_file(pool: &SqlitePool, file: &NewMangaFile) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO MangaFiles (chapter_id, file_path, format, pages) VALUES (?, ?, ?, ?)",
    )
    .bind(file.chapter_id)
    .bind(&file.file_path)
    .bind(file.format)
    .bind(file.pages)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find volume entity by id
pub async fn get_volume_by_id(pool: &SqlitePool, volume_id: i64) -> Result<Option<Volume>> {
    let volume = sqlx::query_as::<_, Volume>("SELECT * FROM Volumes WHERE volume_id = ?")
        .bind(volume_id)
        .fetch_optional(pool)
        .await?;

    Ok(volume)
}

/// All volumes of a series with nested chapters, enriched for the user
///
/// Volumes and chapters are each ordered by number ascending. Chapters are
/// fetched in one bulk read across all volumes, never per volume.
pub async fn get_volumes_dto(
    pool: &SqlitePool,
    series_id: i64,
    user_id: i64,
) -> Result<Vec<VolumeDto>> {
    let mut volumes = sqlx::query_as::<_, VolumeDto>(
        "SELECT volume_id AS id, series_id, number FROM Volumes WHERE series_id = ? ORDER BY number",
    )
    .bind(series_id)
    .fetch_all(pool)
    .await?;

    if volumes.is_empty() {
        return Ok(volumes);
    }

    let placeholders = sql_placeholders(volumes.len());
    let chapters_sql = format!(
        "SELECT chapter_id AS id, volume_id, number, pages FROM Chapters WHERE volume_id IN ({placeholders}) ORDER BY number"
    );
    let mut chapters_query = sqlx::query_as::<_, ChapterDto>(&chapters_sql);
    for volume in &volumes {
        chapters_query = chapters_query.bind(volume.id);
    }
    let chapters = chapters_query.fetch_all(pool).await?;

    for volume in &mut volumes {
        volume.chapters = chapters
            .iter()
            .filter(|c| c.volume_id == volume.id)
            .cloned()
            .collect();
    }

    add_volume_modifiers(pool, user_id, &mut volumes).await?;

    Ok(volumes)
}

/// Single volume with nested chapters and files, enriched for the user
pub async fn get_volume_dto(
    pool: &SqlitePool,
    volume_id: i64,
    user_id: i64,
) -> Result<VolumeDto> {
    let volume = sqlx::query_as::<_, VolumeDto>(
        "SELECT volume_id AS id, series_id, number FROM Volumes WHERE volume_id = ?",
    )
    .bind(volume_id)
    .fetch_optional(pool)
    .await?;

    let mut volume = volume.ok_or(TankobonError::NotFound {
        entity: "Volume",
        id: volume_id,
    })?;

    volume.chapters = sqlx::query_as::<_, ChapterDto>(
        "SELECT chapter_id AS id, volume_id, number, pages FROM Chapters WHERE volume_id = ? ORDER BY number",
    )
    .bind(volume_id)
    .fetch_all(pool)
    .await?;

    if !volume.chapters.is_empty() {
        #[derive(sqlx::FromRow)]
        struct FileRow {
            chapter_id: i64,
            id: i64,
            file_path: String,
            format: i32,
            pages: i32,
        }

        let placeholders = sql_placeholders(volume.chapters.len());
        let files_sql = format!(
            r#"
            SELECT chapter_id, file_id AS id, file_path, format, pages
            FROM MangaFiles WHERE chapter_id IN ({placeholders})
            "#
        );
        let mut files_query = sqlx::query_as::<_, FileRow>(&files_sql);
        for chapter in &volume.chapters {
            files_query = files_query.bind(chapter.id);
        }
        let files = files_query.fetch_all(pool).await?;

        for chapter in &mut volume.chapters {
            chapter.files = files
                .iter()
                .filter(|f| f.chapter_id == chapter.id)
                .map(|f| MangaFileDto {
                    id: f.id,
                    file_path: f.file_path.clone(),
                    format: f.format,
                    pages: f.pages,
                })
                .collect();
        }
    }

    let mut volumes = vec![volume];
    add_volume_modifiers(pool, user_id, &mut volumes).await?;

    Ok(volumes.remove(0))
}

/// Flatten the Series -> Volume -> Chapter tree for a set of series into a
/// flat chapter id list. Order is unspecified; every descendant chapter
/// appears exactly once.
pub async fn get_chapter_ids_for_series(
    pool: &SqlitePool,
    series_ids: &[i64],
) -> Result<Vec<i64>> {
    if series_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = sql_placeholders(series_ids.len());
    let sql = format!(
        r#"
        SELECT c.chapter_id
        FROM Chapters c
        INNER JOIN Volumes v ON c.volume_id = v.volume_id
        WHERE v.series_id IN ({placeholders})
        "#
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for id in series_ids {
        query = query.bind(id);
    }
    let chapter_ids = query.fetch_all(pool).await?;

    Ok(chapter_ids)
}

// ============================================================================
// DELETE / COVER IMAGES
// ============================================================================

/// Delete a series and, transitively, all volumes/chapters/files beneath it
///
/// Returns whether a row was actually removed; a nonexistent id yields
/// `false`, not an error. The cascade runs inside the single DELETE
/// statement, so readers observe either the whole tree or none of it.
pub async fn delete_series(pool: &SqlitePool, series_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM Series WHERE series_id = ?")
        .bind(series_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Raw cover image for a series; absent id or absent cover yields None
pub async fn get_series_cover_image(
    pool: &SqlitePool,
    series_id: i64,
) -> Result<Option<Vec<u8>>> {
    let cover: Option<Option<Vec<u8>>> =
        sqlx::query_scalar("SELECT cover_image FROM Series WHERE series_id = ?")
            .bind(series_id)
            .fetch_optional(pool)
            .await?;

    Ok(cover.flatten())
}

/// Raw cover image for a volume; absent id or absent cover yields None
pub async fn get_volume_cover_image(
    pool: &SqlitePool,
    volume_id: i64,
) -> Result<Option<Vec<u8>>> {
    let cover: Option<Option<Vec<u8>>> =
        sqlx::query_scalar("SELECT cover_image FROM Volumes WHERE volume_id = ?")
            .bind(volume_id)
            .fetch_optional(pool)
            .await?;

    Ok(cover.flatten())
}

// ============================================================================
// RANKED VIEWS
// ============================================================================

/// Most recently added series, newest first
///
/// A library id of 0 (or below) applies to all libraries. Ties on the
/// creation timestamp break on series id descending so the ordering is
/// stable.
pub async fn get_recently_added(
    pool: &SqlitePool,
    library_id: i64,
    limit: i32,
) -> Result<Vec<SeriesDto>> {
    let series = sqlx::query_as::<_, SeriesDto>(&format!(
        r#"
        SELECT {SERIES_DTO_COLUMNS} FROM Series
        WHERE (?1 <= 0 OR library_id = ?1)
        ORDER BY created_at DESC, series_id DESC
        LIMIT ?2
        "#
    ))
    .bind(library_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(series)
}

/// Series the user has started but not finished, most recently read first
///
/// Per-series pages read is the sum of this user's progress records under
/// the series; only series with 0 < read < total qualify. After ordering by
/// the user's most recent progress timestamp and applying the limit, series
/// sharing an identical display *name* are collapsed to the first survivor.
/// That name-level dedup matches the original server and is intentional,
/// even though it can drop a legitimately distinct series.
pub async fn get_in_progress(
    pool: &SqlitePool,
    user_id: i64,
    library_id: i64,
    limit: i32,
) -> Result<Vec<SeriesDto>> {
    let mut series = sqlx::query_as::<_, SeriesDto>(
        r#"
        SELECT s.series_id AS id, s.library_id, s.name, s.original_name,
               s.localized_name, s.sort_name, s.pages, s.created_at AS created,
               CAST(SUM(p.pages_read) AS INTEGER) AS pages_read
        FROM Series s
        INNER JOIN AppUserProgresses p ON p.series_id = s.series_id
        WHERE p.app_user_id = ?1
          AND (?2 <= 0 OR s.library_id = ?2)
        GROUP BY s.series_id
        HAVING SUM(p.pages_read) > 0 AND SUM(p.pages_read) < s.pages
        ORDER BY MAX(p.last_modified) DESC
        LIMIT ?3
        "#,
    )
    .bind(user_id)
    .bind(library_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    // Dedup by display name, keeping the most recently read
    let mut seen = HashSet::new();
    series.retain(|s| seen.insert(s.name.clone()));

    Ok(series)
}

// ============================================================================
// PROGRESS / RATING LEDGER
// ============================================================================

/// Record pages read for a (user, chapter) pair
///
/// Inserts on first interaction, updates thereafter; refreshes the
/// last_modified timestamp either way.
pub async fn upsert_progress(pool: &SqlitePool, progress: &NewProgress) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO AppUserProgresses (
            app_user_id, chapter_id, volume_id, series_id, pages_read, last_modified
        ) VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(app_user_id, chapter_id) DO UPDATE SET
            pages_read = excluded.pages_read,
            volume_id = excluded.volume_id,
            series_id = excluded.series_id,
            last_modified = excluded.last_modified
        "#,
    )
    .bind(progress.app_user_id)
    .bind(progress.chapter_id)
    .bind(progress.volume_id)
    .bind(progress.series_id)
    .bind(progress.pages_read)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Find progress for a (user, chapter) pair
pub async fn get_progress(
    pool: &SqlitePool,
    user_id: i64,
    chapter_id: i64,
) -> Result<Option<AppUserProgress>> {
    let progress = sqlx::query_as::<_, AppUserProgress>(
        "SELECT * FROM AppUserProgresses WHERE app_user_id = ? AND chapter_id = ?",
    )
    .bind(user_id)
    .bind(chapter_id)
    .fetch_optional(pool)
    .await?;

    Ok(progress)
}

/// Record a user's rating/review for a series
pub async fn upsert_rating(
    pool: &SqlitePool,
    user_id: i64,
    series_id: i64,
    rating: f32,
    review: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO AppUserRatings (app_user_id, series_id, rating, review)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(app_user_id, series_id) DO UPDATE SET
            rating = excluded.rating,
            review = excluded.review
        "#,
    )
    .bind(user_id)
    .bind(series_id)
    .bind(rating)
    .bind(review)
    .execute(pool)
    .await?;

    Ok(())
}

/// Find a user's rating for a series
pub async fn get_rating(
    pool: &SqlitePool,
    user_id: i64,
    series_id: i64,
) -> Result<Option<AppUserRating>> {
    let rating = sqlx::query_as::<_, AppUserRating>(
        "SELECT * FROM AppUserRatings WHERE app_user_id = ? AND series_id = ?",
    )
    .bind(user_id)
    .bind(series_id)
    .fetch_optional(pool)
    .await?;

    Ok(rating)
}

// ============================================================================
// READER PREFERENCES
// ============================================================================

/// Find a user's reader display settings
pub async fn get_reader_preferences(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<AppUserPreferences>> {
    let prefs = sqlx::query_as::<_, AppUserPreferences>(
        "SELECT * FROM AppUserPreferences WHERE app_user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(prefs)
}

/// Set a user's reader display settings
pub async fn upsert_reader_preferences(
    pool: &SqlitePool,
    user_id: i64,
    reader_mode: ReaderMode,
    layout_mode: LayoutMode,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO AppUserPreferences (app_user_id, reader_mode, layout_mode)
        VALUES (?, ?, ?)
        ON CONFLICT(app_user_id) DO UPDATE SET
            reader_mode = excluded.reader_mode,
            layout_mode = excluded.layout_mode
        "#,
    )
    .bind(user_id)
    .bind(reader_mode as i32)
    .bind(layout_mode as i32)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use std::time::Duration;

    async fn seed_series(pool: &SqlitePool, library_id: i64, name: &str, pages: i32) -> i64 {
        let mut series = NewSeries::new(library_id, name);
        series.pages = pages;
        insert_series(pool, &series).await.expect("Failed to insert series")
    }

    /// Library with one series, one volume, two 100-page chapters
    async fn seed_small_hierarchy(pool: &SqlitePool) -> (i64, i64, i64, i64, i64) {
        let library_id = insert_library(pool, &NewLibrary::new("Manga"))
            .await
            .expect("Failed to insert library");
        let series_id = seed_series(pool, library_id, "Solo Leveling", 200).await;
        let volume_id = insert_volume(pool, &NewVolume::new(series_id, 1))
            .await
            .expect("Failed to insert volume");
        let c1 = insert_chapter(pool, &NewChapter::new(volume_id, 1, 100))
            .await
            .expect("Failed to insert chapter");
        let c2 = insert_chapter(pool, &NewChapter::new(volume_id, 2, 100))
            .await
            .expect("Failed to insert chapter");
        (library_id, series_id, volume_id, c1, c2)
    }

    #[tokio::test]
    async fn test_get_series_by_id_and_not_found() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, series_id, ..) = seed_small_hierarchy(db.pool()).await;

        let series = get_series_by_id(db.pool(), series_id).await.unwrap();
        assert_eq!(series.name, "Solo Leveling");
        assert_eq!(series.pages, 200);

        let err = get_series_by_id(db.pool(), 9999).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_series_by_name_absent_is_none() {
        let db = Database::new_in_memory().await.unwrap();
        seed_small_hierarchy(db.pool()).await;

        let found = get_series_by_name(db.pool(), "Solo Leveling").await.unwrap();
        assert!(found.is_some());

        let missing = get_series_by_name(db.pool(), "Berserk").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_library_listing_ordered_by_sort_name() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();
        seed_series(db.pool(), library_id, "Vinland Saga", 10).await;
        seed_series(db.pool(), library_id, "Akira", 10).await;
        seed_series(db.pool(), library_id, "Monster", 10).await;

        let series = get_series_for_library(db.pool(), library_id).await.unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Akira", "Monster", "Vinland Saga"]);

        // An unknown library is an empty list, not an error
        let empty = get_series_for_library(db.pool(), 404).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_paginated_library_listing() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();
        for i in 0..7 {
            seed_series(db.pool(), library_id, &format!("Series {i}"), 10).await;
        }

        let page = get_series_dto_for_library(db.pool(), library_id, 1, &PagingParams::new(1, 3))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_count, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items[0].name, "Series 0");

        let last = get_series_dto_for_library(db.pool(), library_id, 1, &PagingParams::new(3, 3))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);

        // Past the end: empty slice, same metadata, no error
        let past = get_series_dto_for_library(db.pool(), library_id, 1, &PagingParams::new(9, 3))
            .await
            .unwrap();
        assert!(past.items.is_empty());
        assert_eq!(past.total_count, 7);
        assert_eq!(past.total_pages, 3);
    }

    #[tokio::test]
    async fn test_search_matches_any_name_field() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();

        let mut series = NewSeries::new(library_id, "Attack on Titan");
        series.original_name = "Shingeki no Kyojin".to_string();
        series.localized_name = "L'Attaque des Titans".to_string();
        insert_series(db.pool(), &series).await.unwrap();
        seed_series(db.pool(), library_id, "Dr. Stone", 10).await;

        // Substring of original_name only, case-insensitive
        let hits = search_series(db.pool(), &[library_id], "KYOJIN").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Attack on Titan");
        assert_eq!(hits[0].library_name, "Manga");

        // Empty query returns everything in scope
        let all = search_series(db.pool(), &[library_id], "").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Attack on Titan"); // sort_name order

        // Out-of-scope library hides the series
        let other_library = insert_library(db.pool(), &NewLibrary::new("Comics")).await.unwrap();
        let scoped = search_series(db.pool(), &[other_library], "Titan").await.unwrap();
        assert!(scoped.is_empty());

        // Empty allowed set matches nothing
        let none = search_series(db.pool(), &[], "Titan").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_volumes_dto_nested_and_ordered() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();
        let series_id = seed_series(db.pool(), library_id, "Berserk", 300).await;

        // Insert out of order; retrieval must sort by number
        let v2 = insert_volume(db.pool(), &NewVolume::new(series_id, 2)).await.unwrap();
        let v1 = insert_volume(db.pool(), &NewVolume::new(series_id, 1)).await.unwrap();
        insert_chapter(db.pool(), &NewChapter::new(v1, 2, 20)).await.unwrap();
        insert_chapter(db.pool(), &NewChapter::new(v1, 1, 20)).await.unwrap();
        insert_chapter(db.pool(), &NewChapter::new(v2, 3, 20)).await.unwrap();

        let volumes = get_volumes_dto(db.pool(), series_id, 1).await.unwrap();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].number, 1);
        assert_eq!(volumes[1].number, 2);
        assert_eq!(volumes[0].chapters.len(), 2);
        assert_eq!(volumes[0].chapters[0].number, 1);
        assert_eq!(volumes[0].chapters[1].number, 2);
        assert_eq!(volumes[1].chapters.len(), 1);

        // Series with no volumes is an empty list
        let bare = seed_series(db.pool(), library_id, "One-shot", 30).await;
        assert!(get_volumes_dto(db.pool(), bare, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_volume_dto_with_files() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, _, volume_id, c1, _) = seed_small_hierarchy(db.pool()).await;
        insert_file(db.pool(), &NewMangaFile::new(c1, "/data/solo/v01c01.cbz"))
            .await
            .unwrap();

        let volume = get_volume_dto(db.pool(), volume_id, 1).await.unwrap();
        assert_eq!(volume.chapters.len(), 2);
        assert_eq!(volume.chapters[0].files.len(), 1);
        assert_eq!(volume.chapters[0].files[0].file_path, "/data/solo/v01c01.cbz");
        assert!(volume.chapters[1].files.is_empty());

        let err = get_volume_dto(db.pool(), 9999, 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_chapter_ids_flatten() {
        let db = Database::new_in_memory().await.unwrap();
        let (library_id, series_id, _, c1, c2) = seed_small_hierarchy(db.pool()).await;

        let other = seed_series(db.pool(), library_id, "Berserk", 100).await;
        let other_volume = insert_volume(db.pool(), &NewVolume::new(other, 1)).await.unwrap();
        let c3 = insert_chapter(db.pool(), &NewChapter::new(other_volume, 1, 100)).await.unwrap();

        let mut ids = get_chapter_ids_for_series(db.pool(), &[series_id, other]).await.unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![c1, c2, c3]);

        assert!(get_chapter_ids_for_series(db.pool(), &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_series_cascades() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, series_id, _, c1, _) = seed_small_hierarchy(db.pool()).await;
        insert_file(db.pool(), &NewMangaFile::new(c1, "/data/solo/v01c01.cbz"))
            .await
            .unwrap();

        assert!(delete_series(db.pool(), series_id).await.unwrap());

        // Whole subtree is gone
        assert!(get_volumes_dto(db.pool(), series_id, 1).await.unwrap().is_empty());
        let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM MangaFiles")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(files, 0);

        // Nonexistent id reports no row removed, not an error
        assert!(!delete_series(db.pool(), series_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cover_images() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();

        let mut series = NewSeries::new(library_id, "Akira");
        series.cover_image = Some(vec![0xFF, 0xD8, 0xFF]);
        let series_id = insert_series(db.pool(), &series).await.unwrap();
        let bare_id = seed_series(db.pool(), library_id, "Monster", 10).await;

        let cover = get_series_cover_image(db.pool(), series_id).await.unwrap();
        assert_eq!(cover, Some(vec![0xFF, 0xD8, 0xFF]));

        // Row exists but has no cover
        assert!(get_series_cover_image(db.pool(), bare_id).await.unwrap().is_none());
        // Row does not exist
        assert!(get_series_cover_image(db.pool(), 9999).await.unwrap().is_none());
        assert!(get_volume_cover_image(db.pool(), 9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recently_added_ordering_and_scope() {
        let db = Database::new_in_memory().await.unwrap();
        let manga = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();
        let comics = insert_library(db.pool(), &NewLibrary::new("Comics")).await.unwrap();

        let a = seed_series(db.pool(), manga, "A", 10).await;
        let b = seed_series(db.pool(), manga, "B", 10).await;
        let c = seed_series(db.pool(), comics, "C", 10).await;

        // Created timestamps collide within one second; id desc breaks the tie
        let all = get_recently_added(db.pool(), 0, 10).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c, b, a]);

        let scoped = get_recently_added(db.pool(), manga, 10).await.unwrap();
        let ids: Vec<i64> = scoped.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, a]);

        let limited = get_recently_added(db.pool(), 0, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, c);
    }

    #[tokio::test]
    async fn test_in_progress_excludes_unstarted_and_finished() {
        let db = Database::new_in_memory().await.unwrap();
        let (library_id, series_id, volume_id, c1, c2) = seed_small_hierarchy(db.pool()).await;
        let user_id = 1;

        // No progress yet: nothing in flight
        assert!(get_in_progress(db.pool(), user_id, library_id, 10).await.unwrap().is_empty());

        // Halfway through chapter 1
        upsert_progress(
            db.pool(),
            &NewProgress {
                app_user_id: user_id,
                chapter_id: c1,
                volume_id,
                series_id,
                pages_read: 50,
            },
        )
        .await
        .unwrap();

        let in_flight = get_in_progress(db.pool(), user_id, library_id, 10).await.unwrap();
        assert_eq!(in_flight.len(), 1);
        assert_eq!(in_flight[0].name, "Solo Leveling");
        assert_eq!(in_flight[0].pages_read, 50);

        // Finish both chapters: series drops out
        for (chapter, read) in [(c1, 100), (c2, 100)] {
            upsert_progress(
                db.pool(),
                &NewProgress {
                    app_user_id: user_id,
                    chapter_id: chapter,
                    volume_id,
                    series_id,
                    pages_read: read,
                },
            )
            .await
            .unwrap();
        }
        assert!(get_in_progress(db.pool(), user_id, library_id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_progress_ordering_scope_and_isolation() {
        let db = Database::new_in_memory().await.unwrap();
        let manga = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();
        let comics = insert_library(db.pool(), &NewLibrary::new("Comics")).await.unwrap();

        let mut seeded = Vec::new();
        for (library, name) in [(manga, "First"), (manga, "Second"), (comics, "Third")] {
            let series_id = seed_series(db.pool(), library, name, 100).await;
            let volume_id = insert_volume(db.pool(), &NewVolume::new(series_id, 1)).await.unwrap();
            let chapter_id =
                insert_chapter(db.pool(), &NewChapter::new(volume_id, 1, 100)).await.unwrap();
            seeded.push((series_id, volume_id, chapter_id));
        }

        for (series_id, volume_id, chapter_id) in &seeded {
            upsert_progress(
                db.pool(),
                &NewProgress {
                    app_user_id: 1,
                    chapter_id: *chapter_id,
                    volume_id: *volume_id,
                    series_id: *series_id,
                    pages_read: 10,
                },
            )
            .await
            .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Most recently read first
        let all = get_in_progress(db.pool(), 1, 0, 10).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);

        // Library scope
        let scoped = get_in_progress(db.pool(), 1, manga, 10).await.unwrap();
        let names: Vec<&str> = scoped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);

        // Another user sees nothing
        assert!(get_in_progress(db.pool(), 2, 0, 10).await.unwrap().is_empty());

        // Limit caps the result
        assert_eq!(get_in_progress(db.pool(), 1, 0, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_progress_dedups_by_display_name() {
        let db = Database::new_in_memory().await.unwrap();
        let library_id = insert_library(db.pool(), &NewLibrary::new("Manga")).await.unwrap();

        // Two distinct series sharing one display name
        let mut chapter_of = Vec::new();
        for _ in 0..2 {
            let series_id = seed_series(db.pool(), library_id, "Duplicate", 100).await;
            let volume_id = insert_volume(db.pool(), &NewVolume::new(series_id, 1)).await.unwrap();
            let chapter_id =
                insert_chapter(db.pool(), &NewChapter::new(volume_id, 1, 100)).await.unwrap();
            chapter_of.push((series_id, volume_id, chapter_id));
        }

        for (series_id, volume_id, chapter_id) in &chapter_of {
            upsert_progress(
                db.pool(),
                &NewProgress {
                    app_user_id: 1,
                    chapter_id: *chapter_id,
                    volume_id: *volume_id,
                    series_id: *series_id,
                    pages_read: 40,
                },
            )
            .await
            .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Only the most recently read survivor appears
        let in_flight = get_in_progress(db.pool(), 1, 0, 10).await.unwrap();
        assert_eq!(in_flight.len(), 1);
        assert_eq!(in_flight[0].id, chapter_of[1].0);
    }

    #[tokio::test]
    async fn test_progress_and_rating_ledger() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, series_id, volume_id, c1, _) = seed_small_hierarchy(db.pool()).await;

        upsert_progress(
            db.pool(),
            &NewProgress {
                app_user_id: 1,
                chapter_id: c1,
                volume_id,
                series_id,
                pages_read: 25,
            },
        )
        .await
        .unwrap();
        // Second write updates in place
        upsert_progress(
            db.pool(),
            &NewProgress {
                app_user_id: 1,
                chapter_id: c1,
                volume_id,
                series_id,
                pages_read: 60,
            },
        )
        .await
        .unwrap();

        let progress = get_progress(db.pool(), 1, c1).await.unwrap().unwrap();
        assert_eq!(progress.pages_read, 60);
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM AppUserProgresses")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);

        upsert_rating(db.pool(), 1, series_id, 4.5, Some("Peak fiction")).await.unwrap();
        let rating = get_rating(db.pool(), 1, series_id).await.unwrap().unwrap();
        assert_eq!(rating.rating, 4.5);
        assert_eq!(rating.review.as_deref(), Some("Peak fiction"));

        assert!(get_rating(db.pool(), 2, series_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reader_preferences_roundtrip() {
        let db = Database::new_in_memory().await.unwrap();

        assert!(get_reader_preferences(db.pool(), 1).await.unwrap().is_none());

        upsert_reader_preferences(db.pool(), 1, ReaderMode::UpDown, LayoutMode::Double)
            .await
            .unwrap();
        let prefs = get_reader_preferences(db.pool(), 1).await.unwrap().unwrap();
        assert_eq!(prefs.get_reader_mode(), ReaderMode::UpDown);
        assert_eq!(prefs.get_layout_mode(), LayoutMode::Double);
    }
}
