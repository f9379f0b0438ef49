//! Flushing the staged log to the store

use tracing::{debug, info};

use super::Chain;
use crate::errors::{DocError, Result};
use crate::model::RecordStatus;
use crate::ops::merge;
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Merge the staged log and apply it to the store atomically
    ///
    /// The log is collapsed to one final intent per id (see
    /// [`crate::ops::merge`]) and applied in one store transaction:
    /// creates, then updates, then deletes. On success the log is
    /// cleared and the focus status resets to `Unchanged`. On failure
    /// nothing is persisted and the log is left intact for inspection
    /// or retry. An empty log commits trivially.
    pub fn commit(&mut self) -> Result<()> {
        let merged = merge(&self.context.staged);
        if merged.is_empty() {
            self.context.staged.clear();
            return Ok(());
        }

        let creates = merged.creates;
        let updates: Vec<_> = merged.updates.into_iter().map(|u| u.new).collect();
        let delete_ids: Vec<String> = merged.deletes.iter().map(|r| r.id.clone()).collect();
        debug!(
            creates = creates.len(),
            updates = updates.len(),
            deletes = delete_ids.len(),
            "committing staged operations"
        );

        self.store
            .transaction(&mut |tx| {
                tx.bulk_add(&creates)?;
                tx.bulk_put(&updates)?;
                tx.bulk_delete(&delete_ids)
            })
            .map_err(|e| DocError::CommitFailed {
                creates: creates.len(),
                updates: updates.len(),
                deletes: delete_ids.len(),
                reason: e.to_string(),
            })?;

        self.context.staged.clear();
        self.context.focus.status = RecordStatus::Unchanged;
        info!(
            creates = creates.len(),
            updates = updates.len(),
            deletes = delete_ids.len(),
            "commit applied"
        );
        Ok(())
    }
}
