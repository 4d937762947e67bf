//! SQLite profile store.
//!
//! One `users` table keyed by a unique `name`. Writes are a single
//! `INSERT ... ON CONFLICT(name) DO UPDATE` statement, so each save commits
//! atomically and concurrent saves for the same name resolve to the last
//! committed row.

use async_trait::async_trait;
use chrono::Utc;
use airadvisor_core::error::StoreError;
use airadvisor_core::profile::{AgeGroup, Condition, HealthProfile, ProfileStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// A durable SQLite-backed profile store.
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    /// Open (creating if missing) the database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database; the pool is then
    /// limited to one connection so every query sees the same database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let in_memory = path.contains(":memory:");
        let options = if in_memory || path.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(path)
                .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
        } else {
            SqliteConnectOptions::new().filename(path)
        };

        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 4 })
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite profile store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT UNIQUE NOT NULL,
                condition   TEXT NOT NULL,
                age_group   TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("users table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<HealthProfile, StoreError> {
        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?;
        let condition: String = row
            .try_get("condition")
            .map_err(|e| StoreError::QueryFailed(format!("condition column: {e}")))?;
        let age_group: String = row
            .try_get("age_group")
            .map_err(|e| StoreError::QueryFailed(format!("age_group column: {e}")))?;
        let updated_at_str: String = row
            .try_get("updated_at")
            .map_err(|e| StoreError::QueryFailed(format!("updated_at column: {e}")))?;

        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(HealthProfile {
            name,
            condition: Condition::from(condition),
            age_group: AgeGroup::from(age_group),
            updated_at,
        })
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn save(&self, profile: HealthProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (name, condition, age_group, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                condition = excluded.condition,
                age_group = excluded.age_group,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.name)
        .bind(profile.condition.as_str())
        .bind(profile.age_group.as_str())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("UPSERT failed: {e}")))?;

        debug!(user = %profile.name, "Saved profile");
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Option<HealthProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT name, condition, age_group, updated_at FROM users WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("SELECT failed: {e}")))?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT failed: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }
}
