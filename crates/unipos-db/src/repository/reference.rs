//! # Reference Data Repository
//!
//! Colleges, configuration and report rows: lookup/reference tables with
//! no mutation protocol of note. The export collaborator reads report
//! rows; nothing here writes back into the stock ledger.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use unipos_core::{College, Report};

// =============================================================================
// Write Shape
// =============================================================================

/// A new report row. The id is generated on insert.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    /// Report body as JSON; stored opaquely.
    pub payload: String,
    pub created_by: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reference-data operations.
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReferenceRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Colleges
    // -------------------------------------------------------------------------

    /// Lists every college, name order.
    pub async fn colleges(&self) -> DbResult<Vec<College>> {
        let colleges = sqlx::query_as::<_, College>(
            "SELECT id, name, created_at FROM colleges ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(colleges)
    }

    /// Adds a college and returns it with its generated id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn add_college(&self, name: &str) -> DbResult<College> {
        debug!(name = %name, "Inserting college");

        let now = Utc::now();
        let result = sqlx::query("INSERT INTO colleges (name, created_at) VALUES (?1, ?2)")
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();

        let college = sqlx::query_as::<_, College>(
            "SELECT id, name, created_at FROM colleges WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        college.ok_or_else(|| DbError::not_found("College", id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Gets a configuration value by key.
    pub async fn get_config(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM configuration WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Sets a configuration value, inserting or overwriting as needed.
    pub async fn set_config(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO configuration (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    /// Saves a report row under a fresh UUID and returns it.
    pub async fn add_report(&self, report: &NewReport) -> DbResult<Report> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, title = %report.title, "Inserting report");

        sqlx::query(
            r#"
            INSERT INTO reports (id, title, payload, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(&report.title)
        .bind(&report.payload)
        .bind(report.created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Report {
            id,
            title: report.title.clone(),
            payload: report.payload.clone(),
            created_by: report.created_by,
            created_at: now,
        })
    }

    /// Gets a report by id.
    pub async fn get_report(&self, id: &str) -> DbResult<Option<Report>> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT id, title, payload, created_by, created_at FROM reports WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    /// Lists reports, newest first.
    pub async fn reports(&self, limit: u32) -> DbResult<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT id, title, payload, created_by, created_at FROM reports \
             ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }
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
    async fn test_college_round_trip() {
        let db = fresh_db().await;

        let college = db.reference().add_college("Engineering").await.unwrap();
        assert!(college.id > 0);

        let all = db.reference().colleges().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Engineering");

        let err = db.reference().add_college("Engineering").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_configuration_upsert() {
        let db = fresh_db().await;

        db.reference()
            .set_config("store_name", "Campus Uniforms")
            .await
            .unwrap();
        db.reference()
            .set_config("store_name", "Campus Uniforms Main")
            .await
            .unwrap();

        assert_eq!(
            db.reference().get_config("store_name").await.unwrap(),
            Some("Campus Uniforms Main".to_string())
        );
    }

    #[tokio::test]
    async fn test_report_round_trip() {
        let db = fresh_db().await;
        let admin = db.users().get_by_username("admin").await.unwrap().unwrap();

        let saved = db
            .reference()
            .add_report(&NewReport {
                title: "Weekly Sales".to_string(),
                payload: r#"{"total":0}"#.to_string(),
                created_by: admin.id,
            })
            .await
            .unwrap();

        let fetched = db.reference().get_report(&saved.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Weekly Sales");
        assert_eq!(fetched.created_by, admin.id);

        assert_eq!(db.reference().reports(10).await.unwrap().len(), 1);
    }
}
