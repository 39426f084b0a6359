//! # Activity Repository
//!
//! Append-only activity log. One row per transaction operation (plus
//! logins), each carrying a serialized snapshot of the affected item
//! quantities. Rows are never updated or deleted; only a full database
//! reset clears the log.
//!
//! Reads are simple filtered/ordered selects. No aggregation happens
//! here: dashboards recompute their numbers from the `users`/`items`
//! counter columns instead.

use chrono::{Duration, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use unipos_core::{Activity, ActivityKind, SizeQuantities};

/// Column list shared by every SELECT in this module.
const ACTIVITY_COLUMNS: &str = "id, user_id, kind, description, amount, items, created_at";

// =============================================================================
// Write Shape
// =============================================================================

/// A new activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub kind: ActivityKind,
    pub description: String,
    /// Monetary amount, for kinds that carry one (sales).
    pub amount: Option<i64>,
    /// Size -> quantity snapshot of the affected items, if any.
    pub items: Option<SizeQuantities>,
}

// =============================================================================
// Transaction-Scoped Append
// =============================================================================
// The ops module appends its log entry inside the same SQL transaction
// as the counter updates, so a crash can never leave a logged operation
// without its effects (or vice versa).

pub(crate) async fn append_with<'e, E>(executor: E, activity: &NewActivity) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let snapshot = activity
        .items
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| crate::error::DbError::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO activities (user_id, kind, description, amount, items, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(activity.user_id)
    .bind(activity.kind)
    .bind(&activity.description)
    .bind(activity.amount)
    .bind(snapshot)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for activity log operations.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends one log entry.
    pub async fn append(&self, activity: &NewActivity) -> DbResult<()> {
        debug!(user_id = %activity.user_id, kind = ?activity.kind, "Appending activity");
        append_with(&self.pool, activity).await
    }

    /// Lists a user's activities, newest first.
    pub async fn for_user(&self, user_id: i64, limit: u32) -> DbResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    /// Lists all activities, newest first.
    pub async fn all(&self, limit: u32) -> DbResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    /// Lists activities from the last 24 hours, newest first.
    ///
    /// The cutoff is computed at query time; nothing is materialized.
    pub async fn recent(&self) -> DbResult<Vec<Activity>> {
        let cutoff = Utc::now() - Duration::hours(24);

        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             WHERE created_at >= ?1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
