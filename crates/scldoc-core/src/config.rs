//! Document configuration consumed from the schema-derivation collaborator
//!
//! The configuration is derived offline from the document grammar (an XSD
//! in the SCL case) and supplied read-only: per-tag attribute specs with
//! defaults, namespace assignments, parent/child/descendant/ancestor tag
//! tables, the singleton tag set, and the lifecycle hooks. This engine
//! consumes it; it never derives or validates grammar rules itself.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::chain::Context;
use crate::model::{Namespace, Record, TreeRecord};
use crate::ops::StagedOp;

/// Specification of one attribute on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub required: bool,
    /// Substituted when a required attribute is absent (empty string if None)
    pub default: Option<String>,
    pub namespace: Option<Namespace>,
}

impl AttributeSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            default: None,
            namespace: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: None,
            namespace: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespace = Some(ns);
        self
    }
}

/// Per-tag schema tables
///
/// The attribute list order is the configured attribute sequence used by
/// record standardization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSchema {
    pub namespace: Option<Namespace>,
    pub attributes: Vec<AttributeSpec>,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub descendants: Vec<String>,
    pub ancestors: Vec<String>,
}

impl TagSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespace = Some(ns);
        self
    }

    pub fn with_attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    pub fn with_children<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.children = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_descendants<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.descendants = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Find the spec for an attribute name
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Directive returned by the `before_clone` hook
#[derive(Debug, Clone)]
pub enum CloneDirective {
    /// Clone this node (possibly rewritten) and descend into its subtree
    Keep(TreeRecord),
    /// Omit this node and its whole subtree from the clone
    Skip,
}

/// Hook invoked after standardization, may rewrite the produced record
pub type AfterStandardized = dyn Fn(Record) -> Record + Send + Sync;
/// Hook invoked after add_child stages its operations; receives the child,
/// the updated parent, and the context; returns extra operations to append
pub type AfterCreated = dyn Fn(&Record, &Record, &Context) -> Vec<StagedOp> + Send + Sync;
/// Hook invoked before each node of a deep clone
pub type BeforeClone = dyn Fn(&TreeRecord) -> CloneDirective + Send + Sync;

/// Optional lifecycle hooks, all defaulting to no-ops
#[derive(Default)]
pub struct Hooks {
    pub after_standardized: Option<Box<AfterStandardized>>,
    pub after_created: Option<Box<AfterCreated>>,
    pub before_clone: Option<Box<BeforeClone>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("after_standardized", &self.after_standardized.is_some())
            .field("after_created", &self.after_created.is_some())
            .field("before_clone", &self.before_clone.is_some())
            .finish()
    }
}

/// Read-only document configuration
#[derive(Debug)]
pub struct DocConfig {
    pub root_tag: String,
    pub singletons: HashSet<String>,
    pub tags: HashMap<String, TagSchema>,
    pub hooks: Hooks,
}

impl DocConfig {
    /// Create a configuration for a document rooted at `root_tag`
    ///
    /// The root tag is a singleton by construction: one root per document.
    pub fn new(root_tag: impl Into<String>) -> Self {
        let root_tag = root_tag.into();
        let mut singletons = HashSet::new();
        singletons.insert(root_tag.clone());
        Self {
            root_tag,
            singletons,
            tags: HashMap::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>, schema: TagSchema) -> Self {
        self.tags.insert(tag_name.into(), schema);
        self
    }

    pub fn with_singleton(mut self, tag_name: impl Into<String>) -> Self {
        self.singletons.insert(tag_name.into());
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Schema for a tag, None when the tag is unknown to the grammar
    pub fn tag(&self, tag_name: &str) -> Option<&TagSchema> {
        self.tags.get(tag_name)
    }

    pub fn is_singleton(&self, tag_name: &str) -> bool {
        self.singletons.contains(tag_name)
    }

    /// Configured descendant tags of a tag (empty for unknown tags)
    pub fn descendants(&self, tag_name: &str) -> &[String] {
        self.tag(tag_name)
            .map(|s| s.descendants.as_slice())
            .unwrap_or(&[])
    }
}
