//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the repository ports
//! backed by PostgreSQL via Diesel with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Access rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never leave this module.
//! - **Serializable guards**: multi-statement invariants (first admin, last
//!   list, deleting users without calls) run in one serializable transaction
//!   and report a lost race as a conflict.
//!
//! # Example
//!
//! ```ignore
//! use callboard::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/callboard");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_call_log_repository;
mod diesel_error_mapping;
mod diesel_log_list_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_call_log_repository::DieselCallLogRepository;
pub use diesel_log_list_repository::DieselLogListRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
