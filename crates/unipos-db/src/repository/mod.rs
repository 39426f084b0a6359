//! # Repository Module
//!
//! Database repository implementations for Unipos.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.items().get_by_key("medium")                               │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── list(&self) / list_enabled / list_low_stock                       │
//! │  ├── get_by_id(&self, id) / get_by_key(&self, key)                     │
//! │  ├── insert(&self, item)                                               │
//! │  └── update(&self, id, patch)   ← only provided fields touched         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Reads return point-in-time snapshots with no locking; the four        │
//! │  transaction operations in [`crate::ops`] do their own fetches inside  │
//! │  a SQL transaction instead of going through these snapshots.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Size-variant catalog and stock counters
//! - [`user::UserRepository`] - Accounts, statistics counters, login
//! - [`activity::ActivityRepository`] - Append-only activity log
//! - [`settings::SettingsRepository`] - The three key-value settings tables
//! - [`reference::ReferenceRepository`] - Colleges, configuration, reports

pub mod activity;
pub mod item;
pub mod reference;
pub mod settings;
pub mod user;
