//! SCLDoc Core - Staged document tree engine over a flat record table
//!
//! This crate provides the document layer for SCL-style XML trees,
//! including:
//! - Canonical, status-tagged, and tree-shaped record models
//! - Schema-driven standardization of partial input
//! - An append-only staged operation log with per-id merge semantics
//! - Chain navigation, child/descendant queries, and tree materialization
//! - Staged mutations (add, update, cascade delete, deep clone) with hooks
//! - Atomic commit through a pluggable store accessor boundary
//!
//! Nothing is persisted until [`Chain::commit`]; every read resolves
//! through the staged log first and the store second.

pub mod chain;
pub mod config;
pub mod errors;
pub mod filter;
pub mod logging;
pub mod model;
pub mod ops;
pub mod store;

// Re-export commonly used types
pub use chain::{Chain, Context};
pub use config::{AttributeSpec, CloneDirective, DocConfig, Hooks, TagSchema};
pub use errors::{DocError, Result};
pub use filter::{
    AttrFilter, ChildFilter, DescendantFilter, ExcludeFilter, IncludeFilter, TreeQuery,
};
pub use model::{
    standardize, Attribute, Namespace, Record, RecordInput, RecordStatus, Relationship,
    StatusRecord, TreeRecord,
};
pub use ops::{merge, MergedOps, StagedOp, StagedUpdate};
pub use store::{init_root, MemStore, StoreAccessor};
