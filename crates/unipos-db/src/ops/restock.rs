//! # Restock Operation
//!
//! Adds stock per size and credits the restocker's counters - inside one
//! SQL transaction. A request that applies nothing (all lines filtered
//! or skipped) is a complete no-op: no user write, no activity row.

use chrono::Utc;
use tracing::{debug, info};

use unipos_core::{ActivityKind, RestockLine};

use crate::error::{DbError, DbResult};
use crate::ops::{skip_disabled, OpOutcome};
use crate::pool::Database;
use crate::repository::activity::{self, NewActivity};
use crate::repository::{item, user};

/// Processes a restock.
///
/// ## Per-Line Rule
/// Lines with `amount <= 0` are filtered out before any write. For each
/// remaining line: fetch the item by key; if enabled,
/// `stock = stock + amount`. Disabled or missing keys are skipped under
/// the skip-disabled-items policy.
///
/// ## User Counters
/// Only when the applied total is positive: add it to
/// `today_restock`/`total_stock`, stamp `last_active`, and append a
/// `restock` activity. Otherwise nothing is written at all.
pub async fn process_restock(
    db: &Database,
    lines: &[RestockLine],
    user_id: i64,
) -> DbResult<OpOutcome> {
    debug!(user_id = %user_id, lines = lines.len(), "Processing restock");

    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    let mut outcome = OpOutcome::default();

    for line in lines.iter().filter(|l| l.amount > 0) {
        outcome.requested_units += line.amount;

        match skip_disabled(item::fetch_by_key(&mut *tx, &line.key).await?) {
            Some(item) => {
                sqlx::query(
                    "UPDATE items SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(line.amount)
                .bind(now)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;

                outcome.applied_units += line.amount;
                outcome.applied.insert(line.key.clone(), line.amount);
            }
            None => outcome.skipped_keys.push(line.key.clone()),
        }
    }

    if outcome.applied_units > 0 {
        let user = user::fetch_by_id(&mut *tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id.to_string()))?;

        sqlx::query(
            "UPDATE users SET \
                 today_restock = today_restock + ?1, \
                 total_stock = total_stock + ?1, \
                 last_active = ?2 \
             WHERE id = ?3",
        )
        .bind(outcome.applied_units)
        .bind(now)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        activity::append_with(
            &mut *tx,
            &NewActivity {
                user_id: user.id,
                kind: ActivityKind::Restock,
                description: format!("Restocked {} item(s)", outcome.applied_units),
                amount: None,
                items: Some(outcome.applied.clone()),
            },
        )
        .await?;

        info!(
            username = %user.username,
            applied = outcome.applied_units,
            skipped = outcome.skipped_keys.len(),
            "Restock processed"
        );
    }

    tx.commit().await?;

    Ok(outcome)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::item::ItemPatch;

    async fn fresh_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.initialize().await.unwrap();
        db
    }

    fn line(key: &str, amount: i64) -> RestockLine {
        RestockLine {
            key: key.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_restock_adds_stock_and_credits_user() {
        let db = fresh_db().await;
        let cashier = db
            .users()
            .get_by_username("cashier")
            .await
            .unwrap()
            .unwrap();

        let outcome = process_restock(
            &db,
            &[line("medium", 20), line("xl", 5)],
            cashier.id,
        )
        .await
        .unwrap();

        assert_eq!(outcome.applied_units, 25);

        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        assert_eq!(medium.stock, 20);

        let cashier = db.users().get_by_id(cashier.id).await.unwrap().unwrap();
        assert_eq!(cashier.today_restock, 25);
        assert_eq!(cashier.total_stock, 25);

        let activities = db.activities().for_user(cashier.id, 10).await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::Restock);
    }

    #[tokio::test]
    async fn test_zero_amount_lines_are_a_noop() {
        let db = fresh_db().await;
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();
        let before_active = user.last_active;

        let outcome = process_restock(&db, &[line("xxl", 0)], user.id).await.unwrap();

        assert_eq!(outcome.requested_units, 0);
        assert_eq!(outcome.applied_units, 0);

        // No stock change, no user-counter change, no activity.
        let xxl = db.items().get_by_key("xxl").await.unwrap().unwrap();
        assert_eq!(xxl.stock, 0);

        let user = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.today_restock, 0);
        assert_eq!(user.last_active, before_active);

        assert!(db.activities().for_user(user.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_items_are_skipped() {
        let db = fresh_db().await;
        let xs = db.items().get_by_key("xs").await.unwrap().unwrap();
        db.items()
            .update(
                xs.id,
                &ItemPatch {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();

        let outcome = process_restock(
            &db,
            &[line("xs", 10), line("medium", 5)],
            user.id,
        )
        .await
        .unwrap();

        assert_eq!(outcome.applied_units, 5);
        assert_eq!(outcome.skipped_keys, vec!["xs".to_string()]);

        let xs = db.items().get_by_key("xs").await.unwrap().unwrap();
        assert_eq!(xs.stock, 0);

        // Only the applied amount reaches the user counters.
        let user = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.total_stock, 5);
    }

    #[tokio::test]
    async fn test_fully_skipped_restock_writes_nothing() {
        let db = fresh_db().await;
        let xs = db.items().get_by_key("xs").await.unwrap().unwrap();
        db.items()
            .update(
                xs.id,
                &ItemPatch {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();

        let outcome = process_restock(&db, &[line("xs", 10)], user.id).await.unwrap();

        assert_eq!(outcome.applied_units, 0);
        assert_eq!(outcome.skipped_keys, vec!["xs".to_string()]);
        assert!(db.activities().for_user(user.id, 10).await.unwrap().is_empty());
    }
}
