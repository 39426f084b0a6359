//! # Sale Operation
//!
//! Deducts stock per size, credits the seller's counters, and logs the
//! sale - all inside one SQL transaction.

use chrono::Utc;
use tracing::{debug, info};

use unipos_core::{ActivityKind, SizeQuantities};

use crate::error::{DbError, DbResult};
use crate::ops::{positive_lines, skip_disabled, OpOutcome};
use crate::pool::Database;
use crate::repository::activity::{self, NewActivity};
use crate::repository::{item, user};

/// Processes a sale.
///
/// ## Per-Size Rule
/// For each size with quantity > 0: fetch the item; if it exists and is
/// enabled, `stock = max(0, stock - quantity)` and the item's `sold`
/// counter grows by the full quantity. Disabled or missing sizes are
/// silently skipped (the skip-disabled-items policy) and their
/// quantities drop out of every total.
///
/// ## User Counters
/// The applied unit total is added to `today_sold`/`total_sold`. The
/// caller-supplied `total_amount` is added **verbatim** to
/// `today_revenue`/`total_revenue` - the store does not recompute it
/// from item prices and accepts an inconsistent amount without
/// complaint. `last_active` is stamped.
///
/// ## Returns
/// The [`OpOutcome`] with requested vs applied units and skipped keys.
/// Fails with [`DbError::NotFound`] when the user id is unknown; the
/// transaction rolls back and no item row is touched.
pub async fn process_sale(
    db: &Database,
    quantities: &SizeQuantities,
    user_id: i64,
    total_amount: i64,
) -> DbResult<OpOutcome> {
    debug!(user_id = %user_id, total_amount = %total_amount, "Processing sale");

    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    let mut outcome = OpOutcome::default();

    for (key, qty) in positive_lines(quantities) {
        outcome.requested_units += qty;

        match skip_disabled(item::fetch_by_key(&mut *tx, key).await?) {
            Some(item) => {
                let new_stock = item.stock_after_deduction(qty);

                sqlx::query(
                    "UPDATE items SET stock = ?1, sold = sold + ?2, updated_at = ?3 \
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
             today_sold = today_sold + ?1, \
             total_sold = total_sold + ?1, \
             today_revenue = today_revenue + ?2, \
             total_revenue = total_revenue + ?2, \
             last_active = ?3 \
         WHERE id = ?4",
    )
    .bind(outcome.applied_units)
    .bind(total_amount)
    .bind(now)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    activity::append_with(
        &mut *tx,
        &NewActivity {
            user_id: user.id,
            kind: ActivityKind::Sale,
            description: format!("Sold {} item(s)", outcome.applied_units),
            amount: Some(total_amount),
            items: Some(outcome.applied.clone()),
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        username = %user.username,
        applied = outcome.applied_units,
        skipped = outcome.skipped_keys.len(),
        "Sale processed"
    );

    Ok(outcome)
}

// =============================================================================
// Unit Tests
// =============================================================================
