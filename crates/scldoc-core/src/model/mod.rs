//! Canonical record model and its presentation variants

mod record;
mod standardize;
mod status;

pub use record::{Attribute, Namespace, Record, Relationship};
pub use standardize::{standardize, RecordInput};
pub use status::{RecordStatus, StatusRecord, TreeRecord};
