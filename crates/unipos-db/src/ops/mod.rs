//! # Transaction Operations
//!
//! The four stock-mutation operations: sale, restock, rejection, return.
//! Each translates one UI-originated business event into a consistent
//! set of store mutations.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One transaction operation                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── fan out over the quantity map                                   │
//! │    │     ├── fetch item row by key                                     │
//! │    │     ├── apply the per-row rule (clamp / add / skip)               │
//! │    │     └── UPDATE items ...                                          │
//! │    │                                                                    │
//! │    ├── UPDATE users ... (counter deltas + last_active)                 │
//! │    │                                                                    │
//! │    └── INSERT INTO activities ... (snapshot of applied quantities)     │
//! │    │                                                                    │
//! │  COMMIT ← all three effects land together or not at all                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The operations take the [`Database`](crate::Database) handle
//! explicitly - there is no module-level connection - and every
//! operation runs inside a single SQL transaction, so a crash between
//! statements cannot leave an item updated without its user counters.
//!
//! ## The Skip-Disabled-Items Policy
//!
//! Sale and restock treat disabled or missing item keys as nonexistent:
//! their quantities are silently dropped from all totals rather than
//! reported as errors. This is a deliberate, named policy (the
//! `skip_disabled` helper below) - the caller-displayed "items
//! processed" count may therefore be lower than the submitted quantity
//! map. Rejection and return apply to disabled items too; only
//! genuinely missing keys are skipped there.

pub mod rejection;
pub mod restock;
pub mod returns;
pub mod sale;

pub use rejection::process_rejected;
pub use restock::process_restock;
pub use returns::process_returned;
pub use sale::process_sale;

use serde::{Deserialize, Serialize};

use unipos_core::{Item, SizeQuantities};

// =============================================================================
// Outcome
// =============================================================================

/// What one transaction operation actually did.
///
/// `requested_units` counts every positive line in the input;
/// `applied_units` counts only the lines that reached an item row.
/// The difference is exactly the skipped keys' quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpOutcome {
    /// Sum of all positive quantities submitted.
    pub requested_units: i64,
    /// Sum of quantities that were applied to an item row.
    pub applied_units: i64,
    /// The applied size -> quantity map (what the activity log records).
    pub applied: SizeQuantities,
    /// Keys whose quantities were dropped (disabled or missing items).
    pub skipped_keys: Vec<String>,
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// The skip-disabled-items policy in one place: a disabled item is
/// treated as nonexistent for sale and restock purposes.
pub(crate) fn skip_disabled(item: Option<Item>) -> Option<Item> {
    item.filter(|i| i.enabled)
}

/// Iterates the positive lines of a quantity map. Zero and negative
/// quantities never reach the store.
pub(crate) fn positive_lines(
    quantities: &SizeQuantities,
) -> impl Iterator<Item = (&str, i64)> + '_ {
    quantities
        .iter()
        .filter(|(_, qty)| **qty > 0)
        .map(|(key, qty)| (key.as_str(), *qty))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(enabled: bool) -> Item {
        Item {
            id: 1,
            key: "medium".to_string(),
            label: "Medium".to_string(),
            price: 450,
            stock: 10,
            sold: 0,
            rejected: 0,
            low_stock_threshold: 10,
            enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_skip_disabled_policy() {
        assert!(skip_disabled(Some(item(true))).is_some());
        assert!(skip_disabled(Some(item(false))).is_none());
        assert!(skip_disabled(None).is_none());
    }

    #[test]
    fn test_positive_lines_filters_zero_and_negative() {
        let mut map = SizeQuantities::new();
        map.insert("medium".to_string(), 3);
        map.insert("xl".to_string(), 0);
        map.insert("xs".to_string(), -2);

        let lines: Vec<_> = positive_lines(&map).collect();
        assert_eq!(lines, vec![("medium", 3)]);
    }
}
