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


//! Database schema migrations
//!
//! Schema creation and versioned migrations, tracked in the `_migrations`
//! table. Ported from Kavita's EF Core migrations; since sqlx's compile-time
//! migration system requires a build-time database connection, migrations run
//! as SQL at startup instead.
//!
//! Note: one-time *data* transforms (as opposed to schema changes) live in
//! `manual_migrations` and use their own ledger.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};

/// Run all database migrations
///
/// Creates the schema and applies any pending migrations in order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    run_migration(pool, 1, "initial_schema", create_initial_schema(pool)).await?;

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Create initial database schema
///
/// The content hierarchy is a strict ownership tree: every child table
/// carries its parent's id and cascades on delete. The per-user ledgers
/// (progress, ratings) are a separate aggregate and deliberately carry no
/// foreign keys into the content tree - deleting a series never implicitly
/// deletes a user's progress records.
async fn create_initial_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
-- ============================================================================
-- CONTENT HIERARCHY
-- ============================================================================

-- Libraries: top-level content roots
CREATE TABLE IF NOT EXISTS Libraries (
    library_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Series: a logical work within a library
-- Maps to C# Series entity; name/original_name/localized_name are all
-- search targets, sort_name is the default ordering key, pages is the
-- scanner-maintained sum of all descendant chapters' page counts.
CREATE TABLE IF NOT EXISTS Series (
    series_id INTEGER PRIMARY KEY AUTOINCREMENT,
    library_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    original_name TEXT NOT NULL,
    localized_name TEXT NOT NULL,
    sort_name TEXT NOT NULL,
    pages INTEGER NOT NULL DEFAULT 0,
    cover_image BLOB,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (library_id) REFERENCES Libraries(library_id) ON DELETE CASCADE
);

-- Volumes: ordered subdivisions of a series (order key: number)
CREATE TABLE IF NOT EXISTS Volumes (
    volume_id INTEGER PRIMARY KEY AUTOINCREMENT,
    series_id INTEGER NOT NULL,
    number INTEGER NOT NULL DEFAULT 0,
    cover_image BLOB,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (series_id) REFERENCES Series(series_id) ON DELETE CASCADE
);

-- Chapters: the leaf reading unit
CREATE TABLE IF NOT EXISTS Chapters (
    chapter_id INTEGER PRIMARY KEY AUTOINCREMENT,
    volume_id INTEGER NOT NULL,
    number INTEGER NOT NULL DEFAULT 0,
    pages INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (volume_id) REFERENCES Volumes(volume_id) ON DELETE CASCADE
);

-- MangaFiles: on-disk artifacts backing a chapter
CREATE TABLE IF NOT EXISTS MangaFiles (
    file_id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_id INTEGER NOT NULL,
    file_path TEXT NOT NULL,
    format INTEGER NOT NULL DEFAULT 0,  -- MangaFormat enum
    pages INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (chapter_id) REFERENCES Chapters(chapter_id) ON DELETE CASCADE
);

-- ============================================================================
-- PER-USER LEDGERS (independent aggregate, no FKs into the content tree)
-- ============================================================================

-- AppUserProgresses: pages read per (user, chapter), with denormalized
-- volume/series ids for join efficiency
CREATE TABLE IF NOT EXISTS AppUserProgresses (
    progress_id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_user_id INTEGER NOT NULL,
    chapter_id INTEGER NOT NULL,
    volume_id INTEGER NOT NULL,
    series_id INTEGER NOT NULL,
    pages_read INTEGER NOT NULL DEFAULT 0,
    last_modified TEXT NOT NULL,
    UNIQUE(app_user_id, chapter_id)
);

-- AppUserRatings: one rating/review per (user, series)
CREATE TABLE IF NOT EXISTS AppUserRatings (
    app_user_id INTEGER NOT NULL,
    series_id INTEGER NOT NULL,
    rating REAL NOT NULL DEFAULT 0.0,
    review TEXT,
    PRIMARY KEY (app_user_id, series_id)
);

-- AppUserPreferences: reader display settings per user
CREATE TABLE IF NOT EXISTS AppUserPreferences (
    app_user_id INTEGER PRIMARY KEY,
    reader_mode INTEGER NOT NULL DEFAULT 0,  -- ReaderMode enum
    layout_mode INTEGER NOT NULL DEFAULT 0   -- LayoutMode enum
);

-- ============================================================================
-- MANUAL MIGRATION LEDGER (append-only, one row per migration name)
-- ============================================================================

CREATE TABLE IF NOT EXISTS ManualMigrationHistory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    product_version TEXT NOT NULL,
    ran_at TEXT NOT NULL
);

-- ============================================================================
-- INDEXES for Performance
-- ============================================================================

CREATE INDEX IF NOT EXISTS idx_series_library ON Series(library_id, sort_name);
CREATE INDEX IF NOT EXISTS idx_series_name ON Series(name);
CREATE INDEX IF NOT EXISTS idx_series_created ON Series(created_at);

CREATE INDEX IF NOT EXISTS idx_volumes_series ON Volumes(series_id, number);
CREATE INDEX IF NOT EXISTS idx_chapters_volume ON Chapters(volume_id, number);
CREATE INDEX IF NOT EXISTS idx_files_chapter ON MangaFiles(chapter_id);

CREATE INDEX IF NOT EXISTS idx_progress_user_series ON AppUserProgresses(app_user_id, series_id);
CREATE INDEX IF NOT EXISTS idx_progress_user_volume ON AppUserProgresses(app_user_id, volume_id);

-- ============================================================================
-- TRIGGERS for Automatic Timestamp Updates
-- ============================================================================

CREATE TRIGGER IF NOT EXISTS update_series_timestamp
AFTER UPDATE ON Series
FOR EACH ROW
BEGIN
    UPDATE Series SET updated_at = CURRENT_TIMESTAMP WHERE series_id = NEW.series_id;
END;
        "#,
    )
    .await?;

    Ok(())
}
