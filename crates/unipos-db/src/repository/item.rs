//! # Item Repository
//!
//! Database operations for the size-variant catalog.
//!
//! ## Snapshot Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Read-Modify-Write at this layer                        │
//! │                                                                         │
//! │  get_by_key("medium")  ──► Item { stock: 25, ... }   (snapshot)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  caller computes new counters                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update(id, ItemPatch { stock: Some(20), .. })                         │
//! │                                                                         │
//! │  No locking, no versioning: the repository applies exactly what it     │
//! │  is given. Invariants (stock >= 0) are the caller's job; the stock     │
//! │  ledger in crate::ops clamps before writing and runs inside one SQL    │
//! │  transaction instead of using these snapshot reads.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use unipos_core::Item;

/// Column list shared by every SELECT in this module.
const ITEM_COLUMNS: &str =
    "id, key, label, price, stock, sold, rejected, low_stock_threshold, enabled, \
     created_at, updated_at";

// =============================================================================
// Write Shapes
// =============================================================================

/// A new catalog row. Counters always start at zero.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub key: String,
    pub label: String,
    pub price: i64,
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub enabled: bool,
}

/// Partial update of an item row.
///
/// Only the provided fields are touched; unspecified fields are left
/// exactly as they are. The patch applies values verbatim - it does not
/// clamp stock or re-validate invariants (the schema-level
/// `CHECK (stock >= 0)` is the only backstop). Callers that deduct stock
/// must pre-clamp; the transaction operations do.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub label: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub sold: Option<i64>,
    pub rejected: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub enabled: Option<bool>,
}

impl ItemPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.sold.is_none()
            && self.rejected.is_none()
            && self.low_stock_threshold.is_none()
            && self.enabled.is_none()
    }
}

// =============================================================================
// Transaction-Scoped Fetches
// =============================================================================
// The ops module re-reads rows inside its own SQL transaction; these
// helpers accept any executor so both the pooled repository methods and
// in-transaction reads share one query text.

pub(crate) async fn fetch_by_key<'e, E>(executor: E, key: &str) -> DbResult<Option<Item>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, Item>(
        "SELECT id, key, label, price, stock, sold, rejected, low_stock_threshold, enabled, \
         created_at, updated_at FROM items WHERE key = ?1",
    )
    .bind(key)
    .fetch_optional(executor)
    .await?;

    Ok(item)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
///
/// let all = repo.list().await?;
/// let medium = repo.get_by_key("medium").await?;
/// repo.update(medium.id, &ItemPatch { price: Some(500), ..Default::default() }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists every item, smallest row id first (seed order).
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists enabled items only.
    ///
    /// ## Usage
    /// The shop and restock views show exactly this set; disabled items
    /// are invisible there.
    pub async fn list_enabled(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE enabled = 1 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists enabled items at or below their low-stock threshold.
    ///
    /// Feeds the low-stock alert banner; the store itself never blocks a
    /// sale on this condition.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE enabled = 1 AND stock <= low_stock_threshold ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by its row id.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its business key (e.g. `"medium"`).
    pub async fn get_by_key(&self, key: &str) -> DbResult<Option<Item>> {
        fetch_by_key(&self.pool, key).await
    }

    /// Inserts a new catalog row and returns it with its generated id.
    ///
    /// ## Returns
    /// * `Ok(Item)` - Inserted row
    /// * `Err(DbError::UniqueViolation)` - Key already exists
    pub async fn insert(&self, item: &NewItem) -> DbResult<Item> {
        debug!(key = %item.key, "Inserting item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO items (key, label, price, stock, sold, rejected,
                               low_stock_threshold, enabled, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&item.key)
        .bind(&item.label)
        .bind(item.price)
        .bind(item.stock)
        .bind(item.low_stock_threshold)
        .bind(item.enabled)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id.to_string()))
    }

    /// Applies a partial update to an item row.
    ///
    /// Only fields present in the patch are written; an empty patch is a
    /// no-op. `updated_at` is stamped on every non-empty patch.
    ///
    /// ## Returns
    /// * `Ok(())` - Update applied
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    pub async fn update(&self, id: i64, patch: &ItemPatch) -> DbResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        debug!(id = %id, "Updating item");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE items SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(label) = &patch.label {
            query.push(", label = ").push_bind(label);
        }
        if let Some(price) = patch.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(stock) = patch.stock {
            query.push(", stock = ").push_bind(stock);
        }
        if let Some(sold) = patch.sold {
            query.push(", sold = ").push_bind(sold);
        }
        if let Some(rejected) = patch.rejected {
            query.push(", rejected = ").push_bind(rejected);
        }
        if let Some(threshold) = patch.low_stock_threshold {
            query.push(", low_stock_threshold = ").push_bind(threshold);
        }
        if let Some(enabled) = patch.enabled {
            query.push(", enabled = ").push_bind(enabled);
        }

        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id.to_string()));
        }

        Ok(())
    }

    /// Counts catalog rows (enabled or not).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sums the item counters for dashboard tiles.
    ///
    /// Dashboards recompute aggregates directly from the counter columns;
    /// no rollups are maintained anywhere.
    pub async fn stock_summary(&self) -> DbResult<StockSummary> {
        let summary = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT
                COALESCE(SUM(stock), 0)    AS stock_on_hand,
                COALESCE(SUM(sold), 0)     AS units_sold,
                COALESCE(SUM(rejected), 0) AS units_rejected
            FROM items
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Item-side aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct StockSummary {
    pub stock_on_hand: i64,
    pub units_sold: i64,
    pub units_rejected: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
