//! Filtered subtree materialization

use std::collections::HashSet;

use super::{resolve_link, Chain};
use crate::errors::Result;
use crate::filter::{ExcludeFilter, ExcludeScope, IncludeFilter, TreeQuery};
use crate::model::{StatusRecord, TreeRecord};
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Materialize the focus subtree, applying the three tree filters
    ///
    /// Recursive descent from the current focus. At each level excludes
    /// run first (`Subtree` drops a matching node entirely, `Children`
    /// keeps it as a leaf), then the include branches decide which
    /// remaining children are kept. Unwrap is a post-processing pass that
    /// replaces each node whose tag is in the set with its own
    /// already-processed children.
    pub fn get_tree(&self, query: &TreeQuery) -> Result<TreeRecord> {
        let branches: Option<&[IncludeFilter]> =
            query.include.as_ref().map(std::slice::from_ref);
        let mut root = self.build_subtree(&self.context.focus, branches, &query.exclude)?;
        apply_unwrap(&mut root, &query.unwrap);
        Ok(root)
    }

    fn build_subtree(
        &self,
        node: &StatusRecord,
        branches: Option<&[IncludeFilter]>,
        exclude: &[ExcludeFilter],
    ) -> Result<TreeRecord> {
        let mut out = TreeRecord {
            record: node.record.clone(),
            status: node.status,
            tree: Vec::new(),
        };

        for rel in &node.record.children {
            let child = match resolve_link(&self.store, &self.context.staged, rel)? {
                Some(child) => child,
                None => continue,
            };

            // excludes first: a node can be dropped even if include would keep it
            match exclude.iter().find(|e| e.matches(&child.record)) {
                Some(hit) if hit.scope == ExcludeScope::Subtree => continue,
                Some(hit) if hit.scope == ExcludeScope::Children => {
                    out.tree.push(TreeRecord::leaf(child.record, child.status));
                    continue;
                }
                _ => {}
            }

            let next_branches = match branches {
                None => None,
                Some(bs) => match bs.iter().find(|b| b.matches(&child.record)) {
                    Some(branch) if branch.children.is_empty() => None,
                    Some(branch) => Some(branch.children.as_slice()),
                    None => continue,
                },
            };

            out.tree.push(self.build_subtree(&child, next_branches, exclude)?);
        }
        Ok(out)
    }
}

/// Replace unwrapped nodes in-place by their own children, bottom-up, so
/// an unwrap target's descendants can themselves be unwrapped
fn apply_unwrap(node: &mut TreeRecord, tags: &HashSet<String>) {
    if tags.is_empty() {
        return;
    }
    for child in &mut node.tree {
        apply_unwrap(child, tags);
    }
    let mut promoted = Vec::with_capacity(node.tree.len());
    for child in node.tree.drain(..) {
        if tags.contains(&child.record.tag_name) {
            promoted.extend(child.tree);
        } else {
            promoted.push(child);
        }
    }
    node.tree = promoted;
}
