//! # User Repository
//!
//! Database operations for accounts and their statistics counters.
//!
//! ## Login Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      login(username, password)                          │
//! │                                                                         │
//! │  SELECT ... WHERE username = ? AND password = ? AND status = 'active'  │
//! │       │                                                                 │
//! │       ├── row found ──► stamp last_active, append login activity,      │
//! │       │                 return the user                                 │
//! │       │                                                                 │
//! │       └── no row ────► AuthenticationFailed                            │
//! │                                                                         │
//! │  One combined query: wrong username, wrong password and inactive       │
//! │  account are indistinguishable to the caller. That is the contract,    │
//! │  not an accident.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use unipos_core::{ActivityKind, Role, User, UserStatus};

/// Column list shared by every SELECT in this module.
const USER_COLUMNS: &str =
    "id, username, name, password, role, status, total_stock, total_sold, total_revenue, \
     total_rejected, today_restock, today_sold, today_revenue, today_rejected, \
     last_active, created_at";

// =============================================================================
// Write Shapes
// =============================================================================

/// A new account. All counters start at zero.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Partial update of a user row.
///
/// Only the provided fields are touched. Counter fields are set verbatim
/// (the transaction operations add deltas through their own statements,
/// not through this patch).
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub total_stock: Option<i64>,
    pub total_sold: Option<i64>,
    pub total_revenue: Option<i64>,
    pub total_rejected: Option<i64>,
    pub today_restock: Option<i64>,
    pub today_sold: Option<i64>,
    pub today_revenue: Option<i64>,
    pub today_rejected: Option<i64>,
    pub last_active: Option<DateTime<Utc>>,
}

impl UserPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.total_stock.is_none()
            && self.total_sold.is_none()
            && self.total_revenue.is_none()
            && self.total_rejected.is_none()
            && self.today_restock.is_none()
            && self.today_sold.is_none()
            && self.today_revenue.is_none()
            && self.today_rejected.is_none()
            && self.last_active.is_none()
    }
}

// =============================================================================
// Transaction-Scoped Fetches
// =============================================================================

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: i64) -> DbResult<Option<User>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, name, password, role, status, total_stock, total_sold, \
         total_revenue, total_rejected, today_restock, today_sold, today_revenue, \
         today_rejected, last_active, created_at FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists every account, seed order first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Gets a user by row id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        fetch_by_id(&self.pool, id).await
    }

    /// Gets a user by login name.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new account and returns it with its generated id.
    ///
    /// ## Returns
    /// * `Ok(User)` - Inserted row
    /// * `Err(DbError::UniqueViolation)` - Username already exists
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        debug!(username = %user.username, "Inserting user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, name, password, role, status, last_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.role)
        .bind(user.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id.to_string()))
    }

    /// Applies a partial update to a user row.
    ///
    /// ## Returns
    /// * `Ok(())` - Update applied
    /// * `Err(DbError::NotFound)` - User doesn't exist
    pub async fn update(&self, id: i64, patch: &UserPatch) -> DbResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        debug!(id = %id, "Updating user");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE users SET id = id");

        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(password) = &patch.password {
            query.push(", password = ").push_bind(password);
        }
        if let Some(role) = patch.role {
            query.push(", role = ").push_bind(role);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(total_stock) = patch.total_stock {
            query.push(", total_stock = ").push_bind(total_stock);
        }
        if let Some(total_sold) = patch.total_sold {
            query.push(", total_sold = ").push_bind(total_sold);
        }
        if let Some(total_revenue) = patch.total_revenue {
            query.push(", total_revenue = ").push_bind(total_revenue);
        }
        if let Some(total_rejected) = patch.total_rejected {
            query.push(", total_rejected = ").push_bind(total_rejected);
        }
        if let Some(today_restock) = patch.today_restock {
            query.push(", today_restock = ").push_bind(today_restock);
        }
        if let Some(today_sold) = patch.today_sold {
            query.push(", today_sold = ").push_bind(today_sold);
        }
        if let Some(today_revenue) = patch.today_revenue {
            query.push(", today_revenue = ").push_bind(today_revenue);
        }
        if let Some(today_rejected) = patch.today_rejected {
            query.push(", today_rejected = ").push_bind(today_rejected);
        }
        if let Some(last_active) = patch.last_active {
            query.push(", last_active = ").push_bind(last_active);
        }

        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id.to_string()));
        }

        Ok(())
    }

    /// Deletes an account.
    ///
    /// ## Guard Clause
    /// Admin-role accounts can never be deleted, regardless of who asks.
    ///
    /// ## Returns
    /// * `Ok(())` - Account removed (its activities cascade)
    /// * `Err(DbError::AdminDeletionForbidden)` - Target holds the admin role
    /// * `Err(DbError::NotFound)` - User doesn't exist
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let user = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id.to_string()))?;

        if user.is_admin() {
            return Err(DbError::AdminDeletionForbidden {
                username: user.username,
            });
        }

        debug!(id = %id, username = %user.username, "Deleting user");

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Authenticates a user.
    ///
    /// One combined query matches username, password (exact string) and
    /// active status at once; any miss yields the same
    /// [`DbError::AuthenticationFailed`]. On success, `last_active` is
    /// stamped and a `login` activity is appended in the same SQL
    /// transaction.
    pub async fn login(&self, username: &str, password: &str) -> DbResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE username = ?1 AND password = ?2 AND status = 'active'"
        ))
        .bind(username)
        .bind(password)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::AuthenticationFailed)?;

        let now = Utc::now();

        sqlx::query("UPDATE users SET last_active = ?1 WHERE id = ?2")
            .bind(now)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO activities (user_id, kind, description, amount, items, created_at)
            VALUES (?1, ?2, ?3, NULL, NULL, ?4)
            "#,
        )
        .bind(user.id)
        .bind(ActivityKind::Login)
        .bind(format!("{} logged in", user.username))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(username = %user.username, "Login successful");

        Ok(User {
            last_active: now,
            ..user
        })
    }

    /// Sums the per-user counters for dashboard tiles.
    pub async fn sales_summary(&self) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT
                COALESCE(SUM(total_stock), 0)    AS units_restocked,
                COALESCE(SUM(total_sold), 0)     AS units_sold,
                COALESCE(SUM(total_revenue), 0)  AS revenue,
                COALESCE(SUM(total_rejected), 0) AS units_rejected
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// User-side aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct SalesSummary {
    pub units_restocked: i64,
    pub units_sold: i64,
    pub revenue: i64,
    pub units_rejected: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn fresh_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.initialize().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_login_success_stamps_last_active() {
        let db = fresh_db().await;

        let before = db.users().get_by_username("admin").await.unwrap().unwrap();
        let user = db.users().login("admin", "admin123").await.unwrap();

        assert_eq!(user.username, "admin");
        assert!(user.last_active >= before.last_active);

        // Login leaves an audit trail entry.
        let activities = db.activities().for_user(user.id, 10).await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::Login);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let db = fresh_db().await;

        // Wrong password, unknown username, inactive account: same error.
        let wrong_pass = db.users().login("admin", "wrongpass").await.unwrap_err();
        let unknown = db.users().login("nonexistent", "123").await.unwrap_err();

        let cashier = db
            .users()
            .get_by_username("cashier")
            .await
            .unwrap()
            .unwrap();
        db.users()
            .update(
                cashier.id,
                &UserPatch {
                    status: Some(UserStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let inactive = db.users().login("cashier", "cashier123").await.unwrap_err();

        for err in [wrong_pass, unknown, inactive] {
            assert!(matches!(err, DbError::AuthenticationFailed));
        }
    }

    #[tokio::test]
    async fn test_admin_cannot_be_deleted() {
        let db = fresh_db().await;
        let admin = db.users().get_by_username("admin").await.unwrap().unwrap();

        let err = db.users().delete(admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::AdminDeletionForbidden { .. }));

        // Still there.
        assert!(db.users().get_by_id(admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cashier_delete_cascades_activities() {
        let db = fresh_db().await;

        let cashier = db.users().login("cashier", "cashier123").await.unwrap();
        db.users().delete(cashier.id).await.unwrap();

        assert!(db.users().get_by_id(cashier.id).await.unwrap().is_none());
        let remaining = db.activities().all(50).await.unwrap();
        assert!(remaining.iter().all(|a| a.user_id != cashier.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = fresh_db().await;

        let err = db
            .users()
            .insert(&NewUser {
                username: "admin".to_string(),
                name: "Second Admin".to_string(),
                password: "pw".to_string(),
                role: Role::Cashier,
                status: UserStatus::Active,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_patch_touches_only_given_fields() {
        let db = fresh_db().await;
        let cashier = db
            .users()
            .get_by_username("cashier")
            .await
            .unwrap()
            .unwrap();

        db.users()
            .update(
                cashier.id,
                &UserPatch {
                    name: Some("Front Desk".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = db.users().get_by_id(cashier.id).await.unwrap().unwrap();
        assert_eq!(after.name, "Front Desk");
        assert_eq!(after.username, "cashier");
        assert_eq!(after.password, cashier.password);
        assert_eq!(after.total_sold, 0);
    }
}
