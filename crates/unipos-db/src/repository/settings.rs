//! # Settings Repository
//!
//! The three settings tables (`reservation_settings`, `return_settings`,
//! `monitoring_settings`) are plain key-value stores with no
//! transactional behavior. One repository type serves all three; the
//! table is chosen at construction time.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Store Selector
// =============================================================================

/// Which settings table a repository instance is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsStore {
    Reservation,
    Return,
    Monitoring,
}

impl SettingsStore {
    /// The backing table name. Static strings only - this is interpolated
    /// into SQL text, never bound as a parameter.
    fn table(self) -> &'static str {
        match self {
            SettingsStore::Reservation => "reservation_settings",
            SettingsStore::Return => "return_settings",
            SettingsStore::Monitoring => "monitoring_settings",
        }
    }
}

/// One settings row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository bound to one of the three settings tables.
///
/// ## Usage
/// ```rust,ignore
/// let settings = db.settings(SettingsStore::Return);
/// settings.set("window_days", "7").await?;
/// let window = settings.get("window_days").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    store: SettingsStore,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository for the given store.
    pub fn new(pool: SqlitePool, store: SettingsStore) -> Self {
        SettingsRepository { pool, store }
    }

    /// Gets a value by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(&format!(
            "SELECT value FROM {} WHERE key = ?1",
            self.store.table()
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Sets a value, inserting or overwriting as needed.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(store = ?self.store, key = %key, "Writing setting");

        sqlx::query(&format!(
            "INSERT INTO {} (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, \
             updated_at = excluded.updated_at",
            self.store.table()
        ))
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists every row in this store, key order.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(&format!(
            "SELECT key, value, updated_at FROM {} ORDER BY key",
            self.store.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings(SettingsStore::Return);

        assert_eq!(settings.get("window_days").await.unwrap(), None);

        settings.set("window_days", "7").await.unwrap();
        assert_eq!(
            settings.get("window_days").await.unwrap(),
            Some("7".to_string())
        );

        // Overwrite wins.
        settings.set("window_days", "14").await.unwrap();
        assert_eq!(
            settings.get("window_days").await.unwrap(),
            Some("14".to_string())
        );
    }

    #[tokio::test]
    async fn test_stores_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.settings(SettingsStore::Reservation)
            .set("enabled", "true")
            .await
            .unwrap();

        assert_eq!(
            db.settings(SettingsStore::Monitoring)
                .get("enabled")
                .await
                .unwrap(),
            None
        );
        assert_eq!(db.settings(SettingsStore::Reservation).all().await.unwrap().len(), 1);
    }
}
