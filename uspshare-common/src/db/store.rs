//! Persistence gateway handle
//!
//! [`Store`] owns the connection pool and is handed to request handlers as an
//! explicit dependency. Entity operations live in sibling modules as further
//! `impl Store` blocks.

use super::deadline::{bounded, QueryCost};
use super::models::PlatformStats;
use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = super::init::init_database(db_path).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read a value from the settings table
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        bounded(
            QueryCost::Point,
            "get_setting",
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Insert a setting unless the key already exists; returns the stored value
    ///
    /// Concurrent first-time writers all observe the same winning value.
    pub async fn init_setting(&self, key: &str, value: &str) -> Result<String> {
        bounded(
            QueryCost::Point,
            "init_setting",
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO NOTHING")
                .bind(key)
                .bind(value)
                .execute(&self.pool),
        )
        .await?;

        bounded(
            QueryCost::Point,
            "init_setting",
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_one(&self.pool),
        )
        .await
    }

    /// Platform counters, queried concurrently; the first failure wins
    pub async fn platform_stats(&self) -> Result<PlatformStats> {
        let (users, resources, courses) = tokio::try_join!(
            self.count_users(),
            self.count_resources(),
            self.count_catalog_courses(),
        )?;

        Ok(PlatformStats {
            users,
            resources,
            courses,
        })
    }

    pub async fn count_users(&self) -> Result<i64> {
        bounded(
            QueryCost::Aggregate,
            "count_users",
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )
        .await
    }

    pub async fn count_resources(&self) -> Result<i64> {
        bounded(
            QueryCost::Aggregate,
            "count_resources",
            sqlx::query_scalar("SELECT COUNT(*) FROM resources").fetch_one(&self.pool),
        )
        .await
    }

    /// Distinct course codes in the catalog, uploaded or not
    pub async fn count_catalog_courses(&self) -> Result<i64> {
        bounded(
            QueryCost::Aggregate,
            "count_catalog_courses",
            sqlx::query_scalar("SELECT COUNT(DISTINCT code) FROM courses").fetch_one(&self.pool),
        )
        .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Fresh in-memory store; one connection so every query sees the same database
    pub async fn memory_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init::create_schema(&pool).await.unwrap();
        Store::new(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::memory_store;

    #[tokio::test]
    async fn test_init_setting_keeps_first_value() {
        let store = memory_store().await;

        assert_eq!(store.get_setting("jwt_secret").await.unwrap(), None);
        let first = store.init_setting("jwt_secret", "alpha").await.unwrap();
        let second = store.init_setting("jwt_secret", "beta").await.unwrap();

        assert_eq!(first, "alpha");
        assert_eq!(second, "alpha");
        assert_eq!(store.get_setting("jwt_secret").await.unwrap().as_deref(), Some("alpha"));
    }

    #[tokio::test]
    async fn test_platform_stats_on_empty_store() {
        let store = memory_store().await;
        let stats = store.platform_stats().await.unwrap();
        assert_eq!((stats.users, stats.resources, stats.courses), (0, 0, 0));
    }
}
