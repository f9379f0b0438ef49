//! Multi-level descendant path matching

use std::collections::{HashMap, HashSet};

use super::{effective_scan, resolve_link, Chain};
use crate::errors::Result;
use crate::filter::{DescendantFilter, TreeQuery};
use crate::model::StatusRecord;
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Find descendants of the focus, grouped by tag
    ///
    /// Without a filter, returns every descendant reachable from the
    /// focus, one entry per tag; tags the configuration lists as
    /// descendants of the focus tag appear even when no instances exist.
    ///
    /// With a filter, the `{tag_name, attributes, descendant}` chain is
    /// flattened into an ordered path. All effective records matching the
    /// deepest level are queried directly (ignoring position), then each
    /// candidate is validated bottom-up through its ancestor links with
    /// skip-level semantics: ancestors whose tag is not the level's tag
    /// are transparent, the first tag match per level is binding, and its
    /// attributes must satisfy the level. After the whole path, the focus
    /// itself is located the same way and must match by id, or the
    /// candidate is rejected. Accepted candidates contribute themselves
    /// and every bound ancestor, restricted to tags named in the filter
    /// chain, deduplicated by id.
    pub fn find_descendants(
        &self,
        filter: Option<&DescendantFilter>,
    ) -> Result<HashMap<String, Vec<StatusRecord>>> {
        match filter {
            None => self.all_descendants(),
            Some(filter) => self.matching_descendants(filter),
        }
    }

    fn all_descendants(&self) -> Result<HashMap<String, Vec<StatusRecord>>> {
        let focus_tag = &self.context.focus.record.tag_name;
        let mut out: HashMap<String, Vec<StatusRecord>> = self
            .config
            .descendants(focus_tag)
            .iter()
            .map(|tag| (tag.clone(), Vec::new()))
            .collect();

        let tree = self.get_tree(&TreeQuery::default())?;
        for node in tree.descendants() {
            out.entry(node.record.tag_name.clone())
                .or_default()
                .push(StatusRecord::new(node.record.clone(), node.status));
        }
        Ok(out)
    }

    fn matching_descendants(
        &self,
        filter: &DescendantFilter,
    ) -> Result<HashMap<String, Vec<StatusRecord>>> {
        let path = filter.flatten();
        let deepest = path[path.len() - 1];
        let focus = &self.context.focus.record;

        let mut out: HashMap<String, Vec<StatusRecord>> = path
            .iter()
            .map(|level| (level.tag_name.clone(), Vec::new()))
            .collect();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        let candidates = effective_scan(
            &self.store,
            &self.context.staged,
            &deepest.tag_name,
            deepest.attributes.as_ref(),
        )?;

        'candidate: for candidate in candidates {
            // the candidate plus the record bound at each shallower level
            let mut bound: Vec<StatusRecord> = vec![candidate.clone()];
            let mut cursor = candidate;

            for level in path[..path.len() - 1].iter().rev() {
                cursor = match self.climb_to_tag(cursor, &level.tag_name)? {
                    Some(ancestor) => ancestor,
                    None => continue 'candidate,
                };
                if let Some(attrs) = &level.attributes {
                    if !attrs.matches(&cursor.record) {
                        continue 'candidate;
                    }
                }
                bound.push(cursor.clone());
            }

            // the focus tag acts as an implicit shallowest level; the
            // first ancestor carrying it must be the focus itself
            cursor = match self.climb_to_tag(cursor, &focus.tag_name)? {
                Some(ancestor) => ancestor,
                None => continue 'candidate,
            };
            if cursor.record.id != focus.id {
                continue 'candidate;
            }

            for record in bound {
                let key = (record.record.tag_name.clone(), record.record.id.clone());
                if seen.insert(key) {
                    out.entry(record.record.tag_name.clone())
                        .or_default()
                        .push(record);
                }
            }
        }
        Ok(out)
    }

    /// Walk ancestor links upward from `from`, skipping ancestors whose
    /// tag differs, until one carries `tag_name`
    ///
    /// Returns None when the chain runs out (or passes through a record
    /// that no longer resolves) before a match.
    fn climb_to_tag(
        &self,
        from: StatusRecord,
        tag_name: &str,
    ) -> Result<Option<StatusRecord>> {
        let mut cursor = from;
        loop {
            let parent_rel = match &cursor.record.parent {
                Some(rel) => rel.clone(),
                None => return Ok(None),
            };
            cursor = match resolve_link(&self.store, &self.context.staged, &parent_rel)? {
                Some(parent) => parent,
                None => return Ok(None),
            };
            if cursor.record.tag_name == tag_name {
                return Ok(Some(cursor));
            }
        }
    }
}
