use std::collections::HashMap;

use super::log::StagedOp;
use crate::model::Record;

/// A merged update intent, preserving the first-ever staged `old`
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpdate {
    pub old: Record,
    pub new: Record,
}

/// The collapsed intent set: three disjoint lists, one entry per id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedOps {
    pub creates: Vec<Record>,
    pub updates: Vec<StagedUpdate>,
    pub deletes: Vec<Record>,
}

impl MergedOps {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of final intents
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}

/// Per-id slot while folding the log
enum Slot {
    Created(Record),
    Updated { old: Record, new: Record },
    Deleted(Record),
    /// created then deleted within the log: never persisted, terminal
    Annihilated,
}

/// Collapse an ordered operation log into a minimal final intent set
///
/// Folds operations per id in log order:
/// - first operation for an id is stored as-is
/// - created + updated -> created carrying the incoming record
/// - created + deleted -> removed entirely (never persisted)
/// - updated + updated -> updated, keeping the original `old`
/// - updated + deleted -> deleted, keeping the original `old`
/// - deleted is terminal: anything after it for the same id is ignored
///
/// Output lists preserve the order of each id's first appearance in the
/// log, so commits apply deterministically.
pub fn merge(staged: &[StagedOp]) -> MergedOps {
    let mut slots: HashMap<String, Slot> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for op in staged {
        let id = op.id().to_string();
        match slots.remove(&id) {
            None => {
                order.push(id.clone());
                let slot = match op.clone() {
                    StagedOp::Created { new } => Slot::Created(new),
                    StagedOp::Updated { old, new } => Slot::Updated { old, new },
                    StagedOp::Deleted { old } => Slot::Deleted(old),
                };
                slots.insert(id, slot);
            }
            Some(existing) => {
                let next = match (existing, op) {
                    (Slot::Created(_), StagedOp::Updated { new, .. }) => {
                        Slot::Created(new.clone())
                    }
                    (Slot::Created(_), StagedOp::Deleted { .. }) => Slot::Annihilated,
                    (Slot::Updated { old, .. }, StagedOp::Updated { new, .. }) => Slot::Updated {
                        old,
                        new: new.clone(),
                    },
                    (Slot::Updated { old, .. }, StagedOp::Deleted { .. }) => Slot::Deleted(old),
                    // deleted (and annihilated) are terminal
                    (terminal @ (Slot::Deleted(_) | Slot::Annihilated), _) => terminal,
                    // degenerate re-stagings keep the incoming intent's shape
                    (Slot::Created(_), StagedOp::Created { new }) => Slot::Created(new.clone()),
                    (Slot::Updated { old, .. }, StagedOp::Created { new }) => Slot::Updated {
                        old,
                        new: new.clone(),
                    },
                };
                slots.insert(id, next);
            }
        }
    }

    let mut merged = MergedOps::default();
    for id in order {
        match slots.remove(&id) {
            Some(Slot::Created(new)) => merged.creates.push(new),
            Some(Slot::Updated { old, new }) => merged.updates.push(StagedUpdate { old, new }),
            Some(Slot::Deleted(old)) => merged.deletes.push(old),
            Some(Slot::Annihilated) | None => {}
        }
    }
    merged
}
