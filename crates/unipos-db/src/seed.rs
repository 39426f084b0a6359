//! # First-Run Seeding & Reset
//!
//! Seeds the default accounts and size catalog into an empty store, and
//! implements the destructive full reset.
//!
//! ## Seeding Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      initialize() decision tree                         │
//! │                                                                         │
//! │  users table empty?  ──yes──► seed one admin + one cashier             │
//! │       │ no                                                              │
//! │       └────────────────────► leave accounts untouched                  │
//! │                                                                         │
//! │  items table empty?  ──yes──► seed the seven XS..3XL variants          │
//! │       │ no                                                              │
//! │       └────────────────────► leave catalog untouched                   │
//! │                                                                         │
//! │  Result: idempotent. Re-running after manual data entry is a no-op.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use unipos_core::default_sizes;

use crate::error::DbResult;

/// Default accounts seeded exactly once: (username, name, password, role).
///
/// Passwords are stored plaintext, faithful to the system this ledger
/// replaces. Operators are expected to change them after first login.
const DEFAULT_ACCOUNTS: &[(&str, &str, &str, &str)] = &[
    ("admin", "Administrator", "admin123", "admin"),
    ("cashier", "Cashier", "cashier123", "cashier"),
];

/// Tables in FK-safe drop order (children before parents), ending with
/// the sqlx migration ledger so a subsequent migration run starts clean.
const DROP_ORDER: &[&str] = &[
    "activities",
    "reports",
    "items",
    "colleges",
    "configuration",
    "reservation_settings",
    "return_settings",
    "monitoring_settings",
    "users",
    "_sqlx_migrations",
];

/// Seeds default accounts and the size catalog into an empty store.
///
/// Idempotent: each table is seeded only when empty, so re-running after
/// manual data entry does not reset anything.
pub async fn seed_defaults(pool: &SqlitePool) -> DbResult<()> {
    let now = Utc::now();

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count == 0 {
        for &(username, name, password, role) in DEFAULT_ACCOUNTS {
            sqlx::query(
                r#"
                INSERT INTO users (username, name, password, role, status, last_active, created_at)
                VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?5)
                "#,
            )
            .bind(username)
            .bind(name)
            .bind(password)
            .bind(role)
            .bind(now)
            .execute(pool)
            .await?;
        }

        info!(count = DEFAULT_ACCOUNTS.len(), "Seeded default accounts");
    }

    let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;

    if item_count == 0 {
        for size in default_sizes() {
            sqlx::query(
                r#"
                INSERT INTO items (key, label, price, stock, sold, rejected,
                                   low_stock_threshold, enabled, created_at, updated_at)
                VALUES (?1, ?2, ?3, 0, 0, 0, ?4, 1, ?5, ?5)
                "#,
            )
            .bind(size.key)
            .bind(size.label)
            .bind(size.price)
            .bind(size.low_stock_threshold)
            .bind(now)
            .execute(pool)
            .await?;
        }

        info!(count = default_sizes().len(), "Seeded default size catalog");
    }

    Ok(())
}

/// Drops every table, including the migration ledger.
///
/// Destructive; the caller re-runs migrations and seeding afterwards.
/// Only used as a manual recovery action.
pub async fn reset(pool: &SqlitePool) -> DbResult<()> {
    warn!("Resetting database: dropping all tables");

    for table in DROP_ORDER {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn fresh_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.initialize().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_initialize_seeds_defaults() {
        let db = fresh_db().await;

        assert_eq!(db.items().count().await.unwrap(), 7);

        let users = db.users().list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "admin"));
        assert!(users.iter().any(|u| u.username == "cashier"));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = fresh_db().await;

        // Manual data entry between runs must survive re-initialization.
        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        db.items()
            .update(
                medium.id,
                &crate::repository::item::ItemPatch {
                    stock: Some(42),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        db.initialize().await.unwrap();
        db.initialize().await.unwrap();

        assert_eq!(db.items().count().await.unwrap(), 7);
        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        assert_eq!(medium.stock, 42);
    }

    #[tokio::test]
    async fn test_reset_rebuilds_empty_store() {
        let db = fresh_db().await;

        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        db.items()
            .update(
                medium.id,
                &crate::repository::item::ItemPatch {
                    stock: Some(99),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        db.reset().await.unwrap();

        // Back to pristine defaults: manual edits are gone.
        assert_eq!(db.items().count().await.unwrap(), 7);
        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        assert_eq!(medium.stock, 0);

        let (total, applied) = db.migration_status().await.unwrap();
        assert_eq!(total, applied);
    }
}
