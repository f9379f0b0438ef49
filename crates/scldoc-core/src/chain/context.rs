use crate::errors::{DocError, Result};
use crate::filter::AttrFilter;
use crate::model::{RecordStatus, Relationship, StatusRecord};
use crate::ops::{latest_for_id, StagedOp};
use crate::store::StoreAccessor;

/// The full state threaded through a chain: current focus plus the
/// pending staged-operation log
///
/// Immutable per step: every chain operation produces a new `Context`
/// rather than mutating one in place.
#[derive(Debug, Clone)]
pub struct Context {
    pub focus: StatusRecord,
    pub staged: Vec<StagedOp>,
}

impl Context {
    pub fn new(focus: StatusRecord) -> Self {
        Self {
            focus,
            staged: Vec::new(),
        }
    }
}

/// Resolve an id through the staged log first, the store second
///
/// The most recent staged operation for the id wins; a staged delete is a
/// hard failure. The resolved record's tag must agree with the request.
pub(crate) fn resolve<S: StoreAccessor + ?Sized>(
    store: &S,
    staged: &[StagedOp],
    tag_name: &str,
    id: &str,
) -> Result<StatusRecord> {
    match latest_for_id(staged, id) {
        Some(StagedOp::Deleted { old }) => Err(DocError::DeletedReference {
            tag_name: old.tag_name.clone(),
            id: id.to_string(),
        }),
        Some(op) => {
            if op.tag_name() != tag_name {
                return Err(DocError::TagMismatch {
                    expected: tag_name.to_string(),
                    found: op.tag_name().to_string(),
                    id: id.to_string(),
                });
            }
            let (record, status) = match op {
                StagedOp::Created { new } => (new.clone(), RecordStatus::Created),
                StagedOp::Updated { new, .. } => (new.clone(), RecordStatus::Updated),
                StagedOp::Deleted { .. } => unreachable!("handled above"),
            };
            Ok(StatusRecord::new(record, status))
        }
        None => match store.get(tag_name, id)? {
            Some(record) => Ok(StatusRecord::unchanged(record)),
            None => Err(DocError::NotFound {
                tag_name: tag_name.to_string(),
                id: id.to_string(),
            }),
        },
    }
}

/// Resolve a relationship link, treating staged deletes and dangling
/// links as absence instead of failure
///
/// Used when walking child/ancestor links inside queries, where a missing
/// counterpart rejects a branch rather than aborting the whole query.
pub(crate) fn resolve_link<S: StoreAccessor + ?Sized>(
    store: &S,
    staged: &[StagedOp],
    rel: &Relationship,
) -> Result<Option<StatusRecord>> {
    match resolve(store, staged, &rel.tag_name, &rel.id) {
        Ok(found) => Ok(Some(found)),
        Err(DocError::DeletedReference { .. }) | Err(DocError::NotFound { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// All effective records of a tag: store rows overlaid, in log order,
/// with staged creates (appended), updates (replaced in place), and
/// deletes (removed)
pub(crate) fn effective_scan<S: StoreAccessor + ?Sized>(
    store: &S,
    staged: &[StagedOp],
    tag_name: &str,
    equals: Option<&AttrFilter>,
) -> Result<Vec<StatusRecord>> {
    let mut rows: Vec<StatusRecord> = store
        .scan(tag_name, None)?
        .into_iter()
        .map(StatusRecord::unchanged)
        .collect();

    for op in staged.iter().filter(|op| op.tag_name() == tag_name) {
        match op {
            StagedOp::Created { new } => match rows.iter_mut().find(|r| r.record.id == new.id) {
                // a created row may itself have been loaded from a prior overlay pass
                Some(row) => *row = StatusRecord::new(new.clone(), RecordStatus::Created),
                None => rows.push(StatusRecord::new(new.clone(), RecordStatus::Created)),
            },
            StagedOp::Updated { new, .. } => {
                match rows.iter_mut().find(|r| r.record.id == new.id) {
                    Some(row) => {
                        let status = if row.status == RecordStatus::Created {
                            RecordStatus::Created
                        } else {
                            RecordStatus::Updated
                        };
                        *row = StatusRecord::new(new.clone(), status);
                    }
                    None => rows.push(StatusRecord::new(new.clone(), RecordStatus::Updated)),
                }
            }
            StagedOp::Deleted { old } => rows.retain(|r| r.record.id != old.id),
        }
    }

    if let Some(filter) = equals {
        rows.retain(|r| filter.matches(&r.record));
    }
    Ok(rows)
}
