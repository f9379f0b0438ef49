//! Staged mutations: nothing here touches the store

use tracing::debug;

use super::{resolve_link, Chain, Context};
use crate::config::CloneDirective;
use crate::errors::{DocError, Result};
use crate::model::{
    standardize, Attribute, Record, RecordInput, RecordStatus, StatusRecord, TreeRecord,
};
use crate::ops::StagedOp;
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Standardize `input` and stage it as a child of the focus
    ///
    /// Stages a create for the child and an update for the focus (its
    /// child list gains the new relationship, appended last). The
    /// `after_created` hook, when configured, runs afterwards and may
    /// append further staged operations. With `set_focus` the chain moves
    /// to the new child, otherwise it stays on the (updated) parent.
    pub fn add_child(mut self, input: RecordInput, set_focus: bool) -> Result<Self> {
        let mut child = standardize(input, &self.config);
        child.parent = Some(self.context.focus.record.relationship());

        let old_parent = self.context.focus.record.clone();
        let mut new_parent = old_parent.clone();
        new_parent.add_child(child.relationship());
        let parent_status = updated_status(self.context.focus.status);

        let mut staged = self.context.staged;
        staged.push(StagedOp::Created { new: child.clone() });
        staged.push(StagedOp::Updated {
            old: old_parent,
            new: new_parent.clone(),
        });

        let focus = if set_focus {
            StatusRecord::new(child.clone(), RecordStatus::Created)
        } else {
            StatusRecord::new(new_parent.clone(), parent_status)
        };
        let mut context = Context { focus, staged };

        if let Some(hook) = &self.config.hooks.after_created {
            let extra = hook(&child, &new_parent, &context);
            context.staged.extend(extra);
        }

        debug!(
            tag = %child.tag_name,
            id = %child.id,
            parent = %new_parent.id,
            "staged child create"
        );
        self.context = context;
        Ok(self)
    }

    /// Stage an attribute/value update of the focus
    ///
    /// Merge-only: given attributes replace same-named ones in place or
    /// are appended, attributes not named are untouched, and the value is
    /// replaced only when `Some`.
    pub fn update(mut self, attributes: Vec<Attribute>, value: Option<String>) -> Result<Self> {
        let old = self.context.focus.record.clone();
        let mut new = old.clone();
        for attr in attributes {
            new.set_attribute(attr);
        }
        if let Some(value) = value {
            new.value = value;
        }

        let status = updated_status(self.context.focus.status);
        self.context.staged.push(StagedOp::Updated {
            old,
            new: new.clone(),
        });
        self.context.focus = StatusRecord::new(new, status);
        Ok(self)
    }

    /// Stage deletion of the focus and its entire effective subtree
    ///
    /// One delete per reachable descendant plus one for the focus, and
    /// one update on the parent dropping the focus from its child list.
    /// The chain moves to the updated parent. The root cannot be deleted.
    pub fn delete(mut self) -> Result<Self> {
        let target = self.context.focus.record.clone();
        let parent_rel = target
            .parent
            .clone()
            .ok_or_else(|| DocError::CannotDeleteRoot {
                id: target.id.clone(),
            })?;

        let parent =
            match resolve_link(&self.store, &self.context.staged, &parent_rel)? {
                Some(parent) => parent,
                None => {
                    return Err(DocError::NotFound {
                        tag_name: parent_rel.tag_name,
                        id: parent_rel.id,
                    })
                }
            };
        let mut new_parent = parent.record.clone();
        new_parent.remove_child(&target.id);
        let parent_status = updated_status(parent.status);

        let mut staged = self.context.staged;
        staged.push(StagedOp::Deleted { old: target.clone() });
        stage_subtree_delete(&self.store, &mut staged, &target)?;
        staged.push(StagedOp::Updated {
            old: parent.record,
            new: new_parent.clone(),
        });

        debug!(tag = %target.tag_name, id = %target.id, "staged cascade delete");
        self.context = Context {
            focus: StatusRecord::new(new_parent, parent_status),
            staged,
        };
        Ok(self)
    }

    /// Stage a deep clone of `subtree` under the focus
    ///
    /// Every cloned node gets a fresh id; attributes, values, and child
    /// order are carried over. The `before_clone` hook, when configured,
    /// runs per node and may rewrite it or skip it (dropping its whole
    /// subtree from the clone). With `set_focus` the chain moves to the
    /// root of the clone; when the hook skips the root, nothing is staged
    /// and the focus stays put.
    pub fn deep_clone_child(self, subtree: &TreeRecord, set_focus: bool) -> Result<Self> {
        let (chain, root) = Self::clone_subtree(self, subtree)?;
        match (set_focus, root) {
            (true, Some(rel)) => chain.go_to_element(&rel.tag_name, Some(&rel.id)),
            _ => Ok(chain),
        }
    }

    fn clone_subtree(
        chain: Self,
        node: &TreeRecord,
    ) -> Result<(Self, Option<crate::model::Relationship>)> {
        let directive = match &chain.config.hooks.before_clone {
            Some(hook) => hook(node),
            None => CloneDirective::Keep(node.clone()),
        };
        let node = match directive {
            CloneDirective::Skip => return Ok((chain, None)),
            CloneDirective::Keep(rewritten) => rewritten,
        };

        let mut chain = chain.add_child(clone_input(&node.record), true)?;
        let rel = chain.context.focus.record.relationship();
        for child in &node.tree {
            let (next, _) = Self::clone_subtree(chain, child)?;
            chain = next;
        }
        let chain = chain.go_to_parent()?;
        Ok((chain, Some(rel)))
    }
}

fn updated_status(current: RecordStatus) -> RecordStatus {
    match current {
        RecordStatus::Created => RecordStatus::Created,
        _ => RecordStatus::Updated,
    }
}

/// Everything but the id and the links carries over to the clone
fn clone_input(record: &Record) -> RecordInput {
    RecordInput {
        id: None,
        tag_name: record.tag_name.clone(),
        attributes: record.attributes.clone(),
        value: if record.value.is_empty() {
            None
        } else {
            Some(record.value.clone())
        },
        namespace: record.namespace.clone(),
    }
}

/// Push one staged delete per reachable descendant of `record`
///
/// Children already deleted (or dangling) in the current staged view are
/// skipped; each resolved child is staged before its own children so the
/// log reads top-down.
fn stage_subtree_delete<S: StoreAccessor>(
    store: &S,
    staged: &mut Vec<StagedOp>,
    record: &Record,
) -> Result<()> {
    for rel in &record.children {
        let child = match resolve_link(store, staged, rel)? {
            Some(child) => child,
            None => continue,
        };
        staged.push(StagedOp::Deleted {
            old: child.record.clone(),
        });
        stage_subtree_delete(store, staged, &child.record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocConfig, Hooks};
    use crate::store::{init_root, MemStore};

    fn config() -> DocConfig {
        DocConfig::new("SCL")
    }

    fn chain_with(config: DocConfig) -> Chain<MemStore> {
        let mut store = MemStore::new();
        init_root(&mut store, &config).unwrap();
        Chain::attach(store, config).unwrap()
    }

    fn staged_deletes(chain: &Chain<MemStore>) -> Vec<&str> {
        chain
            .staged()
            .iter()
            .filter_map(|op| match op {
                StagedOp::Deleted { old } => Some(old.id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_add_child_stages_create_and_parent_update() {
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED").with_attribute("name", "IED_1"), true)
            .unwrap();

        assert_eq!(chain.staged().len(), 2);
        assert!(matches!(chain.staged()[0], StagedOp::Created { .. }));
        assert!(matches!(chain.staged()[1], StagedOp::Updated { .. }));

        // focus moved to the child, linked back to the root
        assert_eq!(chain.focus().record.tag_name, "IED");
        assert_eq!(chain.focus().status, RecordStatus::Created);
        let parent = chain.focus().record.parent.as_ref().unwrap();
        assert_eq!(parent.tag_name, "SCL");
    }

    #[test]
    fn test_add_child_without_set_focus_stays_on_parent() {
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED"), false)
            .unwrap();

        assert_eq!(chain.focus().record.tag_name, "SCL");
        assert_eq!(chain.focus().status, RecordStatus::Updated);
        assert_eq!(chain.focus().record.children.len(), 1);

        // the appended relationship points at the staged create
        let created_id = match &chain.staged()[0] {
            StagedOp::Created { new } => new.id.clone(),
            other => panic!("expected create, got {other:?}"),
        };
        assert_eq!(chain.focus().record.children[0].id, created_id);
    }

    #[test]
    fn test_add_child_after_created_hook_appends_ops() {
        let cfg = config().with_hooks(Hooks {
            after_created: Some(Box::new(|child, _parent, _ctx| {
                let mut sibling = Record::new(format!("{}-log", child.id), "LogEntry");
                sibling.parent = child.parent.clone();
                vec![StagedOp::Created { new: sibling }]
            })),
            ..Hooks::default()
        });

        let chain = chain_with(cfg)
            .add_child(RecordInput::new("IED"), true)
            .unwrap();
        assert_eq!(chain.staged().len(), 3);
        assert!(matches!(
            &chain.staged()[2],
            StagedOp::Created { new } if new.tag_name == "LogEntry"
        ));
    }

    #[test]
    fn test_update_merges_attributes_and_keeps_others() {
        let chain = chain_with(config())
            .add_child(
                RecordInput::new("IED")
                    .with_attribute("name", "IED_1")
                    .with_attribute("desc", "old"),
                true,
            )
            .unwrap()
            .update(vec![Attribute::new("desc", "new")], Some("text".into()))
            .unwrap();

        assert_eq!(chain.focus().record.attribute("name"), Some("IED_1"));
        assert_eq!(chain.focus().record.attribute("desc"), Some("new"));
        assert_eq!(chain.focus().record.value, "text");
        // update of a still-staged create keeps Created status
        assert_eq!(chain.focus().status, RecordStatus::Created);
    }

    #[test]
    fn test_update_with_none_value_keeps_value() {
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED").with_value("keep"), true)
            .unwrap()
            .update(vec![Attribute::new("name", "n")], None)
            .unwrap();
        assert_eq!(chain.focus().record.value, "keep");
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let result = chain_with(config()).delete();
        assert!(matches!(result, Err(DocError::CannotDeleteRoot { .. })));
    }

    #[test]
    fn test_delete_cascades_over_staged_subtree() {
        // SCL -> IED -> AccessPoint -> LDevice
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED").with_id("i-1"), true)
            .unwrap()
            .add_child(RecordInput::new("AccessPoint").with_id("p-1"), true)
            .unwrap()
            .add_child(RecordInput::new("LDevice").with_id("ld-1"), true)
            .unwrap()
            .go_to_element("IED", Some("i-1"))
            .unwrap();
        let before = chain.staged().len();
        let chain = chain.delete().unwrap();

        // two descendants: three deletes plus exactly one parent update
        let fresh = &chain.staged()[before..];
        assert_eq!(fresh.iter().filter(|op| op.is_deleted()).count(), 3);
        assert_eq!(
            fresh
                .iter()
                .filter(|op| matches!(op, StagedOp::Updated { .. }))
                .count(),
            1
        );

        // focus lands on the updated parent with the child unlinked
        assert_eq!(chain.focus().record.tag_name, "SCL");
        assert!(chain.focus().record.children.is_empty());
        assert_eq!(staged_deletes(&chain), vec!["i-1", "p-1", "ld-1"]);

        // the deleted subtree is invisible to navigation
        let result = chain.go_to_element("LDevice", Some("ld-1"));
        assert!(matches!(result, Err(DocError::DeletedReference { .. })));
    }

    #[test]
    fn test_delete_skips_already_deleted_children() {
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED").with_id("i-1"), true)
            .unwrap()
            .add_child(RecordInput::new("AccessPoint").with_id("p-1"), true)
            .unwrap()
            .delete()
            .unwrap()
            .delete()
            .unwrap();

        // p-1 was deleted once, not twice
        assert_eq!(staged_deletes(&chain), vec!["p-1", "i-1"]);
    }

    #[test]
    fn test_deep_clone_assigns_fresh_ids_and_keeps_shape() {
        let chain = chain_with(config())
            .add_child(RecordInput::new("IED").with_id("i-1").with_attribute("name", "A"), true)
            .unwrap()
            .add_child(RecordInput::new("AccessPoint").with_id("p-1"), true)
            .unwrap()
            .go_to_element("SCL", None)
            .unwrap();

        let source = chain
            .clone_focus_subtree("IED", "i-1")
            .expect("source subtree");
        let chain = chain.deep_clone_child(&source, true).unwrap();

        assert_eq!(chain.focus().record.tag_name, "IED");
        assert_ne!(chain.focus().record.id, "i-1");
        assert_eq!(chain.focus().record.attribute("name"), Some("A"));
        assert_eq!(chain.focus().record.children.len(), 1);
        assert_ne!(chain.focus().record.children[0].id, "p-1");

        // both originals and clones are effective
        let tree = chain.go_to_element("SCL", None).unwrap();
        let root = tree.materialize().unwrap();
        assert_eq!(root.tree.len(), 2);
    }

    #[test]
    fn test_deep_clone_before_clone_skip_drops_subtree() {
        let cfg = config().with_hooks(Hooks {
            before_clone: Some(Box::new(|node: &TreeRecord| {
                if node.record.tag_name == "AccessPoint" {
                    CloneDirective::Skip
                } else {
                    CloneDirective::Keep(node.clone())
                }
            })),
            ..Hooks::default()
        });

        let chain = chain_with(cfg)
            .add_child(RecordInput::new("IED").with_id("i-1"), true)
            .unwrap()
            .add_child(RecordInput::new("AccessPoint").with_id("p-1"), true)
            .unwrap()
            .add_child(RecordInput::new("LDevice").with_id("ld-1"), true)
            .unwrap()
            .go_to_element("SCL", None)
            .unwrap();

        let source = chain
            .clone_focus_subtree("IED", "i-1")
            .expect("source subtree");
        let chain = chain.deep_clone_child(&source, true).unwrap();

        // the skipped AccessPoint and everything below it are absent
        assert_eq!(chain.focus().record.tag_name, "IED");
        assert!(chain.focus().record.children.is_empty());
        let clone = chain.materialize().unwrap();
        assert!(clone.descendants().is_empty());
    }

    #[test]
    fn test_deep_clone_skip_at_root_stages_nothing() {
        let cfg = config().with_hooks(Hooks {
            before_clone: Some(Box::new(|_: &TreeRecord| CloneDirective::Skip)),
            ..Hooks::default()
        });

        let chain = chain_with(cfg)
            .add_child(RecordInput::new("IED").with_id("i-1"), true)
            .unwrap()
            .go_to_element("SCL", None)
            .unwrap();
        let before = chain.staged().len();

        let source = chain
            .clone_focus_subtree("IED", "i-1")
            .expect("source subtree");
        let chain = chain.deep_clone_child(&source, true).unwrap();

        assert_eq!(chain.staged().len(), before);
        assert_eq!(chain.focus().record.tag_name, "SCL");
    }

    impl Chain<MemStore> {
        /// Test helper: materialized subtree of one child of the focus
        fn clone_focus_subtree(&self, tag_name: &str, id: &str) -> Option<TreeRecord> {
            self.materialize()
                .ok()?
                .tree
                .into_iter()
                .find(|n| n.record.tag_name == tag_name && n.record.id == id)
        }
    }
}
