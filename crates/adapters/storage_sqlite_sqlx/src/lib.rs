//! # farmhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `RuleRepository` over the shared `rules` table
//! - Implement `TimeSeriesStore` over the append-only `readings` table
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `farmhub-app` (for port traits) and `farmhub-domain` (for
//! domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod error;
pub mod pool;
pub mod reading_store;
pub mod rule_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reading_store::SqliteReadingStore;
pub use rule_repo::SqliteRuleRepository;
