//! Database initialization
//!
//! Opens (or creates) the SQLite file and creates every table idempotently.
//! Foreign keys stay off: cascades are carried out by the store as
//! best-effort multi-statement deletes.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_resources_table(pool).await?;
    create_comments_table(pool).await?;
    create_likes_table(pool).await?;
    create_comment_likes_table(pool).await?;
    create_notifications_table(pool).await?;
    create_catalog_tables(pool).await?;
    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            course TEXT NOT NULL DEFAULT '',
            faculty TEXT NOT NULL DEFAULT '',
            year_joined TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            avatar_url TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_resources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            professor_id BLOB,
            course_code TEXT NOT NULL DEFAULT '',
            course TEXT NOT NULL DEFAULT '',
            resource_type TEXT NOT NULL DEFAULT '',
            file_name TEXT NOT NULL,
            file_url TEXT NOT NULL,
            upload_date TEXT NOT NULL,
            likes INTEGER NOT NULL DEFAULT 0,
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            semester TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            is_anonymous INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resources_user ON resources(user_id, upload_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resources_course_code ON resources(course_code)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_comments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id BLOB PRIMARY KEY,
            resource_id BLOB NOT NULL,
            user_id BLOB NOT NULL,
            parent_id BLOB,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_resource ON comments(resource_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_likes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            resource_id BLOB NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, resource_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_likes_resource ON likes(resource_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_comment_likes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comment_likes (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            comment_id BLOB NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, comment_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comment_likes_comment ON comment_likes(comment_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            actor_name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('reply', 'like', 'comment_like', 'share')),
            message TEXT NOT NULL,
            resource_id BLOB NOT NULL,
            comment_id BLOB,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_catalog_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id BLOB PRIMARY KEY,
            code TEXT NOT NULL,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professors (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            avatar_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
