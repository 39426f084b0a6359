//! # Validation Module
//!
//! Input validation utilities for Unipos.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile shell (TypeScript)                                    │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  └── Business rule validation before any store write                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── CHECK (stock >= 0) as the last line of defense                    │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use unipos_core::validation::{validate_item_key, validate_quantity};
//!
//! validate_item_key("medium").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item size key.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Lowercase letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use unipos_core::validation::validate_item_key;
///
/// assert!(validate_item_key("xxl").is_ok());
/// assert!(validate_item_key("").is_err());
/// assert!(validate_item_key("Size M").is_err());
/// ```
pub fn validate_item_key(key: &str) -> ValidationResult<()> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ValidationError::Required {
            field: "key".to_string(),
        });
    }

    if key.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "key".to_string(),
            max: 50,
        });
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "key".to_string(),
            reason: "must contain only lowercase letters, digits, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Alphanumeric, dots, hyphens and underscores only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (user name or item label).
pub fn validate_label(label: &str) -> ValidationResult<()> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "label".to_string(),
        });
    }

    if label.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a single-line quantity for sale/restock/reject/return input.
///
/// Zero is allowed: zero-quantity lines are filtered out by the
/// operations rather than rejected, so a sparse quantity map from the UI
/// is not an error.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 || quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an item price.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_rules() {
        assert!(validate_item_key("medium").is_ok());
        assert!(validate_item_key("xxl").is_ok());
        assert!(validate_item_key("size_2").is_ok());

        assert!(validate_item_key("").is_err());
        assert!(validate_item_key("  ").is_err());
        assert!(validate_item_key("Medium").is_err());
        assert!(validate_item_key("size m").is_err());
        assert!(validate_item_key(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("cashier.01").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(validate_price(450).is_ok());
        assert!(validate_price(0).is_err());
        assert!(validate_price(-5).is_err());
    }
}
