//! SCLDoc Store - SQLite persistence for the document record table
//!
//! Provides:
//! - Connection management and schema bootstrap
//! - A [`SqliteStore`] implementing the core `StoreAccessor` boundary,
//!   with real BEGIN IMMEDIATE / COMMIT / ROLLBACK transaction semantics

pub mod db;
pub mod errors;
pub mod sqlite_store;

// Re-export key types
pub use errors::Result;
pub use sqlite_store::SqliteStore;
