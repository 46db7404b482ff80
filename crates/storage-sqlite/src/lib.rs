//! SQLite storage implementation for ClearCost.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `clearcost-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations and brand dictionary seeding
//! - Repository implementations for rates, the brand/model dictionary, and
//!   calculation history
//! - Database-specific model types (with Diesel derives)
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. `core` is database-agnostic and works with traits.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod catalog;
pub mod history;
pub mod rates;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, seed_brands, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from clearcost-core for convenience
pub use clearcost_core::errors::{DatabaseError, Error, Result};
