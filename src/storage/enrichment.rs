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


//! Per-user enrichment pass
//!
//! Fills the overlay fields of display DTOs (`pages_read`, `user_rating`,
//! `user_review`) from the per-user ledgers. Ported from Kavita's
//! `AddSeriesModifiers` / `AddVolumeModifiers` in `SeriesRepository.cs`.
//!
//! The pass is strictly additive: it never re-reads or reorders the DTOs it
//! receives, and it issues a fixed number of bulk queries regardless of how
//! many DTOs are in the batch.

use crate::error::Result;
use crate::storage::dto::{SeriesDto, VolumeDto};
use crate::storage::queries::sql_placeholders;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Overlay a user's progress and ratings onto a batch of series DTOs
///
/// Two bulk reads cover the whole batch: summed progress per series and the
/// user's ratings. Series the user never touched keep the zero/empty
/// defaults.
pub async fn add_series_modifiers(
    pool: &SqlitePool,
    user_id: i64,
    series: &mut [SeriesDto],
) -> Result<()> {
    if series.is_empty() {
        return Ok(());
    }

    let placeholders = sql_placeholders(series.len());

    let progress_sql = format!(
        r#"
        SELECT series_id, CAST(SUM(pages_read) AS INTEGER)
        FROM AppUserProgresses
        WHERE app_user_id = ? AND series_id IN ({placeholders})
        GROUP BY series_id
        "#
    );
    let mut progress_query = sqlx::query_as::<_, (i64, i32)>(&progress_sql).bind(user_id);
    for s in series.iter() {
        progress_query = progress_query.bind(s.id);
    }
    let pages_read: HashMap<i64, i32> =
        progress_query.fetch_all(pool).await?.into_iter().collect();

    let rating_sql = format!(
        r#"
        SELECT series_id, rating, review
        FROM AppUserRatings
        WHERE app_user_id = ? AND series_id IN ({placeholders})
        "#
    );
    let mut rating_query =
        sqlx::query_as::<_, (i64, f32, Option<String>)>(&rating_sql).bind(user_id);
    for s in series.iter() {
        rating_query = rating_query.bind(s.id);
    }
    let ratings: HashMap<i64, (f32, Option<String>)> = rating_query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(id, rating, review)| (id, (rating, review)))
        .collect();

    for s in series.iter_mut() {
        s.pages_read = pages_read.get(&s.id).copied().unwrap_or(0);
        if let Some((rating, review)) = ratings.get(&s.id) {
            s.user_rating = *rating;
            s.user_review = review.clone();
        }
    }

    Ok(())
}

/// Overlay a user's progress onto a batch of volume DTOs and their chapters
///
/// One bulk read keyed by volume id covers the batch. Chapter sums group the
/// rows by chapter id; the volume sum groups the same rows by the volume id
/// stamped on them. The two levels are computed independently, so a progress
/// row keeps counting toward its volume even if its chapter is not part of
/// the chapters currently nested under the DTO.
pub async fn add_volume_modifiers(
    pool: &SqlitePool,
    user_id: i64,
    volumes: &mut [VolumeDto],
) -> Result<()> {
    if volumes.is_empty() {
        return Ok(());
    }

    let placeholders = sql_placeholders(volumes.len());
    let progress_sql = format!(
        r#"
        SELECT volume_id, chapter_id, pages_read
        FROM AppUserProgresses
        WHERE app_user_id = ? AND volume_id IN ({placeholders})
        "#
    );
    let mut progress_query = sqlx::query_as::<_, (i64, i64, i32)>(&progress_sql).bind(user_id);
    for volume in volumes.iter() {
        progress_query = progress_query.bind(volume.id);
    }
    let rows = progress_query.fetch_all(pool).await?;

    let mut by_volume: HashMap<i64, i32> = HashMap::new();
    let mut by_chapter: HashMap<i64, i32> = HashMap::new();
    for (volume_id, chapter_id, pages_read) in rows {
        *by_volume.entry(volume_id).or_default() += pages_read;
        *by_chapter.entry(chapter_id).or_default() += pages_read;
    }

    for volume in volumes.iter_mut() {
        volume.pages_read = by_volume.get(&volume.id).copied().unwrap_or(0);
        for chapter in &mut volume.chapters {
            chapter.pages_read = by_chapter.get(&chapter.id).copied().unwrap_or(0);
        }
    }

    Ok(())
}
