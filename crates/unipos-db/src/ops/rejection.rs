//! # Rejection Operation
//!
//! Marks defective stock: deducts from `stock` (clamped at zero) and
//! grows the item's `rejected` counter - inside one SQL transaction.
//!
//! Unlike sale and restock, rejection applies to **disabled items too**:
//! defective stock is defective whether or not the size is currently on
//! sale. Only genuinely missing keys are skipped.

use chrono::Utc;
use tracing::{debug, info};

use unipos_core::{ActivityKind, SizeQuantities};

use crate::error::{DbError, DbResult};
use crate::ops::{positive_lines, OpOutcome};
use crate::pool::Database;
use crate::repository::activity::{self, NewActivity};
use crate::repository::{item, user};

/// Processes a rejection.
///
/// ## Per-Size Rule
/// For each size with quantity > 0: fetch the item (enabled flag is
/// ignored here); `stock = max(0, stock - quantity)` and
/// `rejected = rejected + quantity` - the full quantity counts as
/// rejected even when the deduction clamps.
///
/// ## User Counters
/// The applied total is added to `today_rejected`/`total_rejected` and
/// `last_active` is stamped; a `rejected` activity records the snapshot.
pub async fn process_rejected(
    db: &Database,
    quantities: &SizeQuantities,
    user_id: i64,
) -> DbResult<OpOutcome> {
    debug!(user_id = %user_id, "Processing rejection");

    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    let mut outcome = OpOutcome::default();

    for (key, qty) in positive_lines(quantities) {
        outcome.requested_units += qty;

        // No skip_disabled here: rejection ignores the enabled flag.
        match item::fetch_by_key(&mut *tx, key).await? {
            Some(item) => {
                let new_stock = item.stock_after_deduction(qty);

                sqlx::query(
                    "UPDATE items SET stock = ?1, rejected = rejected + ?2, updated_at = ?3 \
                     WHERE id = ?4",
                )
                .bind(new_stock)
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

    sqlx::query(
        "UPDATE users SET \
             today_rejected = today_rejected + ?1, \
             total_rejected = total_rejected + ?1, \
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
            kind: ActivityKind::Rejected,
            description: format!("Marked {} item(s) as rejected", outcome.applied_units),
            amount: None,
            items: Some(outcome.applied.clone()),
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        username = %user.username,
        applied = outcome.applied_units,
        "Rejection processed"
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

    async fn set_stock(db: &Database, key: &str, stock: i64) {
        let item = db.items().get_by_key(key).await.unwrap().unwrap();
        db.items()
            .update(
                item.id,
                &ItemPatch {
                    stock: Some(stock),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    fn qty(pairs: &[(&str, i64)]) -> SizeQuantities {
        pairs.iter().map(|(k, q)| (k.to_string(), *q)).collect()
    }

    #[tokio::test]
    async fn test_rejection_moves_stock_to_rejected() {
        let db = fresh_db().await;
        set_stock(&db, "small", 20).await;
        let user = db.users().get_by_username("cashier").await.unwrap().unwrap();

        process_rejected(&db, &qty(&[("small", 2)]), user.id)
            .await
            .unwrap();

        let small = db.items().get_by_key("small").await.unwrap().unwrap();
        assert_eq!(small.stock, 18);
        assert_eq!(small.rejected, 2);

        let user = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.today_rejected, 2);
        assert_eq!(user.total_rejected, 2);
    }

    #[tokio::test]
    async fn test_rejection_clamps_stock_but_counts_full_quantity() {
        let db = fresh_db().await;
        set_stock(&db, "small", 1).await;
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();

        process_rejected(&db, &qty(&[("small", 5)]), user.id)
            .await
            .unwrap();

        let small = db.items().get_by_key("small").await.unwrap().unwrap();
        assert_eq!(small.stock, 0);
        assert_eq!(small.rejected, 5);
    }

    #[tokio::test]
    async fn test_rejection_applies_to_disabled_items() {
        let db = fresh_db().await;
        set_stock(&db, "xs", 10).await;
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

        let outcome = process_rejected(&db, &qty(&[("xs", 4)]), user.id)
            .await
            .unwrap();

        // Disabled is not skipped here - only missing keys are.
        assert_eq!(outcome.applied_units, 4);

        let xs = db.items().get_by_key("xs").await.unwrap().unwrap();
        assert_eq!(xs.stock, 6);
        assert_eq!(xs.rejected, 4);
    }

    #[tokio::test]
    async fn test_missing_keys_are_skipped() {
        let db = fresh_db().await;
        let user = db.users().get_by_username("admin").await.unwrap().unwrap();

        let outcome = process_rejected(&db, &qty(&[("no-such-size", 3)]), user.id)
            .await
            .unwrap();

        assert_eq!(outcome.applied_units, 0);
        assert_eq!(outcome.skipped_keys, vec!["no-such-size".to_string()]);

        let user = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.total_rejected, 0);
    }
}
