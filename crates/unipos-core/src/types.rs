//! # Domain Types
//!
//! Core domain types used throughout Unipos.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      User       │   │    Activity     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  key ("medium") │   │  username       │   │  kind           │       │
//! │  │  stock / sold   │   │  role / status  │   │  description    │       │
//! │  │  rejected       │   │  total_* today_*│   │  amount / items │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │   UserStatus    │   │  ActivityKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Admin          │   │  Active         │   │  Sale/Restock   │       │
//! │  │  Cashier        │   │  Inactive       │   │  Rejected/...   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Items and users carry integer row ids (the UI passes numeric ids over
//! IPC) plus a human-readable business key (`items.key`, `users.username`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Quantity Maps
// =============================================================================

/// A size-keyed quantity map, e.g. `{"medium": 3, "xl": 1}`.
///
/// ## Why BTreeMap?
/// Deterministic ordering makes serialized activity snapshots stable and
/// diffable; the map is tiny (at most the catalog size) so tree overhead
/// is irrelevant.
pub type SizeQuantities = BTreeMap<String, i64>;

/// One line of a restock request: a size key plus the amount to add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockLine {
    /// Size key, e.g. `"xxl"`.
    pub key: String,
    /// Units to add. Lines with `amount <= 0` are filtered out before
    /// any write happens.
    pub amount: i64,
}

// =============================================================================
// Role
// =============================================================================

/// The role of a system actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: catalog management, user management, resets.
    Admin,
    /// Sales floor access: sell, restock, reject, return.
    Cashier,
}

// =============================================================================
// User Status
// =============================================================================

/// Whether an account can log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable size variant of the uniform (one row per size).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Row id.
    pub id: i64,

    /// Unique business key, e.g. `"medium"`.
    pub key: String,

    /// Display name shown in the shop grid, e.g. `"Medium"`.
    pub label: String,

    /// Price in whole currency units.
    pub price: i64,

    /// Current sellable quantity. Never negative: every mutating
    /// operation clamps to zero instead of going below it.
    pub stock: i64,

    /// Cumulative units sold.
    pub sold: i64,

    /// Cumulative units marked defective.
    pub rejected: i64,

    /// `stock <= low_stock_threshold` raises a low-stock alert in the UI.
    /// The store itself does not enforce anything at this level.
    pub low_stock_threshold: i64,

    /// Disabled items are excluded from all shop/restock views and are
    /// treated as nonexistent by sale and restock operations.
    pub enabled: bool,

    /// When the item was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Checks whether this item should raise a low-stock alert.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    /// Stock after deducting `quantity`, clamped at zero.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // stock = 25
    /// assert_eq!(item.stock_after_deduction(30), 0); // never negative
    /// assert_eq!(item.stock_after_deduction(10), 15);
    /// ```
    #[inline]
    pub fn stock_after_deduction(&self, quantity: i64) -> i64 {
        (self.stock - quantity).max(0)
    }
}

// =============================================================================
// User
// =============================================================================

/// A system actor (admin or cashier) with per-user sales statistics.
///
/// ## Counter Contract
/// Every cumulative counter equals the sum of all transaction deltas ever
/// applied for that user. No audit trail enforces this; the transaction
/// operations uphold it by construction.
///
/// The `today_*` counters have no rollover job and accumulate across
/// calendar days. That matches the observed behavior of the system this
/// ledger replaces; see DESIGN.md for the open question.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Row id (the UI addresses users by this number).
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Display name.
    pub name: String,

    /// Stored as plaintext, matched exactly at login. Faithful to the
    /// system this replaces; never log this field.
    pub password: String,

    pub role: Role,
    pub status: UserStatus,

    /// Cumulative units restocked.
    pub total_stock: i64,
    /// Cumulative units sold.
    pub total_sold: i64,
    /// Cumulative revenue in whole currency units.
    pub total_revenue: i64,
    /// Cumulative units rejected.
    pub total_rejected: i64,

    /// Units restocked "today" (never reset; see type docs).
    pub today_restock: i64,
    pub today_sold: i64,
    pub today_revenue: i64,
    pub today_rejected: i64,

    /// Stamped on every transaction and successful login.
    #[ts(as = "String")]
    pub last_active: DateTime<Utc>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks whether the account may log in.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Checks whether the user holds the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Activity
// =============================================================================

/// The kind of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Sale,
    Restock,
    Rejected,
    Returned,
    Login,
}

/// One append-only activity log entry.
///
/// Rows are never updated or deleted except in bulk by an explicit
/// database reset.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub kind: ActivityKind,
    pub description: String,
    /// Monetary amount, when the activity carries one (sales).
    pub amount: Option<i64>,
    /// Serialized size -> quantity snapshot of the affected items.
    pub items: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Deserializes the item-quantity snapshot, if one was recorded.
    ///
    /// Returns `None` both when no snapshot exists and when the stored
    /// JSON is malformed; the log is informational, not authoritative.
    pub fn quantities(&self) -> Option<SizeQuantities> {
        self.items
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// A college/department the buyer belongs to. Lookup data only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct College {
    pub id: i64,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A saved report row, read by the export collaborator.
/// Identified by an opaque UUID string.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Report {
    pub id: String,
    pub title: String,
    /// Report body as JSON; this crate does not interpret it.
    pub payload: String,
    pub created_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(stock: i64, threshold: i64) -> Item {
        Item {
            id: 1,
            key: "medium".to_string(),
            label: "Medium".to_string(),
            price: 450,
            stock,
            sold: 0,
            rejected: 0,
            low_stock_threshold: threshold,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(sample_item(10, 10).is_low_stock());
        assert!(sample_item(0, 10).is_low_stock());
        assert!(!sample_item(11, 10).is_low_stock());
    }

    #[test]
    fn test_stock_deduction_clamps_at_zero() {
        let item = sample_item(25, 10);
        assert_eq!(item.stock_after_deduction(30), 0);
        assert_eq!(item.stock_after_deduction(25), 0);
        assert_eq!(item.stock_after_deduction(10), 15);
    }

    #[test]
    fn test_activity_quantities_round_trip() {
        let mut map = SizeQuantities::new();
        map.insert("medium".to_string(), 3);
        map.insert("xl".to_string(), 1);

        let activity = Activity {
            id: 1,
            user_id: 1,
            kind: ActivityKind::Sale,
            description: "Sold 4 items".to_string(),
            amount: Some(1800),
            items: Some(serde_json::to_string(&map).unwrap()),
            created_at: Utc::now(),
        };

        assert_eq!(activity.quantities(), Some(map));
    }

    #[test]
    fn test_activity_quantities_tolerates_garbage() {
        let activity = Activity {
            id: 1,
            user_id: 1,
            kind: ActivityKind::Sale,
            description: "Sold items".to_string(),
            amount: None,
            items: Some("not json".to_string()),
            created_at: Utc::now(),
        };

        assert_eq!(activity.quantities(), None);
    }
}
