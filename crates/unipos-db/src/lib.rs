//! # unipos-db: Database Layer for Unipos
//!
//! This crate provides database access for the campus uniform POS.
//! It uses SQLite for local storage with sqlx for async operations, and
//! owns the stock-mutation transaction operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Unipos Data Flow                                 │
//! │                                                                         │
//! │  UI event ("Confirm Order")                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     unipos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐    │   │
//! │  │   │   Database    │   │  Repositories │   │     ops      │    │   │
//! │  │   │   (pool.rs)   │   │ (item, user,  │   │ sale/restock │    │   │
//! │  │   │               │   │  activity...) │   │ reject/return│    │   │
//! │  │   │ SqlitePool    │◄──│ point lookups │◄──│ one SQL tx   │    │   │
//! │  │   │ + migrations  │   │ and patches   │   │ per op       │    │   │
//! │  │   └───────────────┘   └───────────────┘   └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (one per device)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`seed`] - First-run seeding and destructive reset
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (item, user, activity, ...)
//! - [`ops`] - The four stock-mutation transaction operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unipos_db::{ops, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/unipos.db")).await?;
//! db.initialize().await?;
//!
//! let user = db.users().login("cashier", "cashier123").await?;
//! let outcome = ops::process_sale(&db, &quantities, user.id, 900).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod ops;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::activity::ActivityRepository;
pub use repository::item::ItemRepository;
pub use repository::reference::ReferenceRepository;
pub use repository::settings::{SettingsRepository, SettingsStore};
pub use repository::user::UserRepository;

// Transaction operation re-exports
pub use ops::{process_rejected, process_restock, process_returned, process_sale, OpOutcome};
