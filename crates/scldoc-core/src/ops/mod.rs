//! Staged-operation log and the merge engine that collapses it at commit

mod log;
mod merge;

pub use log::{latest_for_id, StagedOp};
pub use merge::{merge, MergedOps, StagedUpdate};
