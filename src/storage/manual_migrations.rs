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


//! One-time data migrations
//!
//! Data transforms that run once per installation, tracked by name in the
//! append-only `ManualMigrationHistory` ledger. Ported from Kavita's
//! `MigrateWebtoonToLayoutMode.cs` and the `ManualMigrationHistory` entity.
//!
//! These are distinct from the schema migrations in `storage::migrations`:
//! schema migrations shape tables, manual migrations rewrite rows. Each
//! transform and its ledger append commit in one transaction, so a crash
//! mid-migration reruns the whole transform on next startup rather than
//! recording it as done.

use crate::error::{Result, TankobonError};
use crate::storage::models::{LayoutMode, ManualMigrationRecord, ReaderMode};
use chrono::Utc;
use sqlx::SqlitePool;

/// Names and versioning for a startup migration run
#[derive(Debug, Clone)]
pub struct MigrationContext {
    product_version: String,
}

impl MigrationContext {
    pub fn new(product_version: impl Into<String>) -> Self {
        Self {
            product_version: product_version.into(),
        }
    }

    pub fn product_version(&self) -> &str {
        &self.product_version
    }
}

/// Run every pending one-time migration, in registration order
///
/// Call after schema migrations at startup. Transforms that already have a
/// ledger row are skipped; a failing transform aborts the run so later
/// migrations never execute on top of a half-migrated state.
pub async fn run_startup_migrations(pool: &SqlitePool, context: &MigrationContext) -> Result<()> {
    migrate_webtoon_to_layout_mode(pool, context)
        .await
        .map_err(|e| {
            TankobonError::MigrationFailed(format!("MigrateWebtoonToLayoutMode: {e}"))
        })?;

    Ok(())
}

/// Whether a named one-time migration has already run
pub async fn has_migration_run(pool: &SqlitePool, name: &str) -> Result<bool> {
    let row: Option<i64> =
        sqlx::query_scalar("SELECT id FROM ManualMigrationHistory WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Full migration ledger, oldest first
pub async fn get_migration_history(pool: &SqlitePool) -> Result<Vec<ManualMigrationRecord>> {
    let history = sqlx::query_as::<_, ManualMigrationRecord>(
        "SELECT * FROM ManualMigrationHistory ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(history)
}

/// Reclassify the retired Webtoon reader mode as a layout mode
///
/// Users who read with `ReaderMode::Webtoon` are moved to the default
/// `LeftRight` page-turn mode with `LayoutMode::Webtoon`, preserving the
/// vertical-strip reading experience under the new settings model. Runs at
/// most once; the ledger row commits atomically with the rewrite.
pub async fn migrate_webtoon_to_layout_mode(
    pool: &SqlitePool,
    context: &MigrationContext,
) -> Result<()> {
    const NAME: &str = "MigrateWebtoonToLayoutMode";

    if has_migration_run(pool, NAME).await? {
        tracing::debug!(migration = NAME, "Already applied, skipping");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE AppUserPreferences SET reader_mode = ?, layout_mode = ? WHERE reader_mode = ?",
    )
    .bind(ReaderMode::LeftRight as i32)
    .bind(LayoutMode::Webtoon as i32)
    .bind(ReaderMode::Webtoon as i32)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO ManualMigrationHistory (name, product_version, ran_at) VALUES (?, ?, ?)",
    )
    .bind(NAME)
    .bind(context.product_version())
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        migration = NAME,
        rows = result.rows_affected(),
        "Applied one-time migration"
    );

    Ok(())
}
