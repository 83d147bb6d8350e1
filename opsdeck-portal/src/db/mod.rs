//! Database access for opsdeck-portal
//!
//! SQLite via sqlx; one module per entity.

pub mod accomplishments;
pub mod applications;
pub mod projects;
pub mod servers;
pub mod users;

use opsdeck_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize portal tables
///
/// Creates all tables if they don't exist. The composite UNIQUE constraint on
/// weekly_accomplishments is the correctness backstop for concurrent
/// duplicate-week submits and must live here, not in application code.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            badge INTEGER PRIMARY KEY,
            email TEXT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            position INTEGER,
            read_only INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS servers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hostname TEXT NOT NULL,
            ip_address TEXT NOT NULL,
            os TEXT NOT NULL,
            status TEXT NOT NULL,
            environment TEXT NOT NULL,
            role TEXT NOT NULL,
            location TEXT NOT NULL,
            folder TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL,
            github_url TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_badge INTEGER NOT NULL REFERENCES users(badge),
            dev_server_id INTEGER REFERENCES servers(id),
            prod_server_id INTEGER REFERENCES servers(id),
            app_name TEXT NOT NULL,
            app_description TEXT,
            status TEXT,
            dev_domain TEXT,
            last_updated TEXT,
            last_updated_by TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_accomplishments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_badge INTEGER NOT NULL REFERENCES users(badge),
            application_id INTEGER REFERENCES applications(id),
            body TEXT NOT NULL,
            submitted_on TEXT NOT NULL,
            week_start TEXT NOT NULL,
            week_end TEXT NOT NULL,
            status TEXT NOT NULL,
            UNIQUE(user_badge, week_start, week_end)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized");

    Ok(())
}

/// Map a sqlx error to `Error::Conflict` when it is a UNIQUE violation,
/// passing everything else through as a database error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return Error::Conflict(what.to_string());
        }
    }
    Error::Database(err)
}
