//! # unipos-core: Pure Business Logic for Unipos
//!
//! This crate is the **heart** of the campus uniform POS. It contains the
//! domain model and business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Unipos Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Mobile Shell (out of scope)                      │   │
//! │  │    Shop UI ──► Restock UI ──► Admin UI ──► Dashboard UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC (JSON-shaped arguments)            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ unipos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │  catalog  │  │ validation│                  │   │
//! │  │   │ Item/User │  │ XS..3XL   │  │   rules   │                  │   │
//! │  │   │ Activity  │  │ defaults  │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    unipos-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, transaction operations      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, User, Activity, etc.)
//! - [`catalog`] - The default seven-size catalog seeded on first run
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All currency values are whole units (i64), no floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use unipos_core::Item` instead of
// `use unipos_core::types::Item`

pub use catalog::{default_sizes, SizeVariant};
pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default low-stock threshold applied to seeded size variants.
///
/// ## Why a constant?
/// The UI raises a low-stock alert when `stock <= low_stock_threshold`.
/// Individual items can override it; new catalog rows start here.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum quantity accepted for a single size line in any operation.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
/// The store never receives a line above this; validation rejects it first.
pub const MAX_LINE_QUANTITY: i64 = 999;
