//! Moving the chain's current focus

use super::{effective_scan, resolve, Chain};
use crate::errors::{DocError, Result};
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Move the focus to another record
    ///
    /// Resolves through the staged log first (the most recent operation
    /// for the id wins; a staged delete fails hard) and the store second.
    /// `id` may be omitted only for tags the configuration marks as
    /// singleton, in which case the first effective match is used.
    ///
    /// # Errors
    /// * `MissingId` - id omitted for a non-singleton tag
    /// * `TagMismatch` - resolved record's tag disagrees with the request
    /// * `DeletedReference` - target is staged as deleted
    /// * `NotFound` - nothing is found in staged log or store
    pub fn go_to_element(mut self, tag_name: &str, id: Option<&str>) -> Result<Self> {
        let target = match id {
            Some(id) => resolve(&self.store, &self.context.staged, tag_name, id)?,
            None => {
                if !self.config.is_singleton(tag_name) {
                    return Err(DocError::MissingId {
                        tag_name: tag_name.to_string(),
                    });
                }
                effective_scan(&self.store, &self.context.staged, tag_name, None)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DocError::NotFound {
                        tag_name: tag_name.to_string(),
                        id: String::new(),
                    })?
            }
        };

        self.context = super::Context {
            focus: target,
            staged: self.context.staged,
        };
        Ok(self)
    }

    /// Move the focus to its parent
    ///
    /// # Errors
    /// * `RootHasNoParent` - focus has no parent link
    pub fn go_to_parent(mut self) -> Result<Self> {
        let parent_rel = self
            .context
            .focus
            .record
            .parent
            .clone()
            .ok_or_else(|| DocError::RootHasNoParent {
                id: self.context.focus.record.id.clone(),
            })?;

        let parent = resolve(
            &self.store,
            &self.context.staged,
            &parent_rel.tag_name,
            &parent_rel.id,
        )?;
        self.context = super::Context {
            focus: parent,
            staged: self.context.staged,
        };
        Ok(self)
    }
}
