use serde::{Deserialize, Serialize};

use crate::model::Record;

/// One staged create/update/delete intent, not yet applied to the store
///
/// Operations are appended to an ordered log as mutations occur; until
/// commit, the log is the only account of pending changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StagedOp {
    Created { new: Record },
    /// `old` and `new` carry the same id and tag
    Updated { old: Record, new: Record },
    Deleted { old: Record },
}

impl StagedOp {
    /// Identity of the record this operation targets
    pub fn id(&self) -> &str {
        match self {
            StagedOp::Created { new } => &new.id,
            StagedOp::Updated { new, .. } => &new.id,
            StagedOp::Deleted { old } => &old.id,
        }
    }

    pub fn tag_name(&self) -> &str {
        match self {
            StagedOp::Created { new } => &new.tag_name,
            StagedOp::Updated { new, .. } => &new.tag_name,
            StagedOp::Deleted { old } => &old.tag_name,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, StagedOp::Deleted { .. })
    }
}

/// Most-recent staged operation for an id, if any
pub fn latest_for_id<'a>(staged: &'a [StagedOp], id: &str) -> Option<&'a StagedOp> {
    staged.iter().rev().find(|op| op.id() == id)
}
