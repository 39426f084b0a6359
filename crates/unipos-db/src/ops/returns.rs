//! # Return Operation
//!
//! Credits customer-returned goods back into stock - inside one SQL
//! transaction. A pure stock credit: no `sold` or `rejected` counter
//! moves, and the user row gets only a `last_active` stamp.

use chrono::Utc;
use tracing::{debug, info};

use unipos_core::{ActivityKind, SizeQuantities};

use crate::error::{DbError, DbResult};
use crate::ops::{positive_lines, OpOutcome};
use crate::pool::Database;
use crate::repository::activity::{self, NewActivity};
use crate::repository::{item, user};

/// Processes a return.
///
/// ## Per-Size Rule
/// For each size with quantity > 0: fetch the item (enabled flag is
/// ignored, like rejection - returned goods come back regardless of
/// whether the size is still on sale); `stock = stock + quantity`.
/// Missing keys are skipped.
///
/// ## User Counters
/// None move. The user row is only stamped with `last_active`; no
/// counter tracks return volume. A `returned` activity records the
/// snapshot.
pub async fn process_returned(
    db: &Database,
    quantities: &SizeQuantities,
    user_id: i64,
) -> DbResult<OpOutcome> {
    debug!(user_id = %user_id, "Processing return");

    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    let mut outcome = OpOutcome::default();

    for (key, qty) in positive_lines(quantities) {
        outcome.requested_units += qty;

        match item::fetch_by_key(&mut *tx, key).await? {
            Some(item) => {
                sqlx::query(
                    "UPDATE items SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(qty)
                .bind(now)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;

                outcome.applied_units += qty;
                outcome.applied.insert(key.to_string(), qty);
            }
            None => outcome.skipped_keys.push(key.to_string()),
        }
    }

    let user = user::fetch_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| DbError::not_found("User", user_id.to_string()))?;

    sqlx::query("UPDATE users SET last_active = ?1 WHERE id = ?2")
        .bind(now)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    activity::append_with(
        &mut *tx,
        &NewActivity {
            user_id: user.id,
            kind: ActivityKind::Returned,
            description: format!("Returned {} item(s)", outcome.applied_units),
            amount: None,
            items: Some(outcome.applied.clone()),
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        username = %user.username,
        applied = outcome.applied_units,
        "Return processed"
    );

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

    fn qty(pairs: &[(&str, i64)]) -> SizeQuantities {
        pairs.iter().map(|(k, q)| (k.to_string(), *q)).collect()
    }

    #[tokio::test]
    async fn test_return_credits_stock_only() {
        let db = fresh_db().await;
        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        db.items()
            .update(
                medium.id,
                &ItemPatch {
                    stock: Some(5),
                    sold: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let user = db.users().get_by_username("cashier").await.unwrap().unwrap();

        process_returned(&db, &qty(&[("medium", 2)]), user.id)
            .await
            .unwrap();

        let medium = db.items().get_by_key("medium").await.unwrap().unwrap();
        assert_eq!(medium.stock, 7);
        // A pure stock credit: sold stays where it was.
        assert_eq!(medium.sold, 10);
    }

    #[tokio::test]
    async fn test_return_only_stamps_user_last_active() {
        let db = fresh_db().await;
        let user = db.users().get_by_username("cashier").await.unwrap().unwrap();
        let before = user.clone();

        process_returned(&db, &qty(&[("medium", 2)]), user.id)
            .await
            .unwrap();

        let after = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert!(after.last_active >= before.last_active);
        // Every counter is untouched.
        assert_eq!(after.total_sold, before.total_sold);
        assert_eq!(after.total_stock, before.total_stock);
        assert_eq!(after.total_rejected, before.total_rejected);
        assert_eq!(after.total_revenue, before.total_revenue);
        assert_eq!(after.today_restock, before.today_restock);
    }

    #[tokio::test]
    async fn test_return_logs_activity() {
        let db = fresh_db().await;
        let user = db.users().get_by_username("cashier").await.unwrap().unwrap();

        process_returned(&db, &qty(&[("xl", 1)]), user.id)
            .await
            .unwrap();

        let activities = db.activities().for_user(user.id, 10).await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::Returned);
        assert_eq!(activities[0].quantities().unwrap().get("xl"), Some(&1));
    }

    #[tokio::test]
    async fn test_missing_keys_are_skipped() {
        let db = fresh_db().await;
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();

        let outcome = process_returned(&db, &qty(&[("no-such-size", 2)]), user.id)
            .await
            .unwrap();

        assert_eq!(outcome.applied_units, 0);
        assert_eq!(outcome.skipped_keys, vec!["no-such-size".to_string()]);
    }
}
