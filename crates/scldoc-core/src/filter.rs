//! Query filter types shared by the query engine and the store boundary

use std::collections::{HashMap, HashSet};

use crate::model::Record;

/// Expected value(s) for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Exact match
    One(String),
    /// Any of the listed values matches (OR)
    Any(Vec<String>),
}

impl FilterValue {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::One(expected) => expected == value,
            FilterValue::Any(expected) => expected.iter().any(|e| e == value),
        }
    }
}

/// Attribute filter: every supplied name must match (AND)
///
/// A record missing one of the filtered attributes never matches.
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrFilter {
    expected: HashMap<String, FilterValue>,
}

impl AttrFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected
            .insert(name.into(), FilterValue::One(value.into()));
        self
    }

    pub fn one_of<I, T>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.expected.insert(
            name.into(),
            FilterValue::Any(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.expected.iter().all(|(name, want)| {
            record
                .attribute(name)
                .map(|value| want.matches(value))
                .unwrap_or(false)
        })
    }
}

/// One requested child tag with an optional attribute filter
#[derive(Debug, Clone, Default)]
pub struct ChildFilter {
    pub tag_name: String,
    pub attributes: Option<AttrFilter>,
}

impl ChildFilter {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attrs: AttrFilter) -> Self {
        self.attributes = Some(attrs);
        self
    }
}

/// A nested tag/attribute chain used to match records at depth
///
/// Intermediate ancestor tags not listed in the chain are transparent
/// (skip-level semantics).
#[derive(Debug, Clone)]
pub struct DescendantFilter {
    pub tag_name: String,
    pub attributes: Option<AttrFilter>,
    pub descendant: Option<Box<DescendantFilter>>,
}

impl DescendantFilter {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
            descendant: None,
        }
    }

    pub fn with_attributes(mut self, attrs: AttrFilter) -> Self {
        self.attributes = Some(attrs);
        self
    }

    pub fn with_descendant(mut self, inner: DescendantFilter) -> Self {
        self.descendant = Some(Box::new(inner));
        self
    }

    /// Flatten the chain into an ordered path, shallowest first
    pub fn flatten(&self) -> Vec<&DescendantFilter> {
        let mut path = vec![self];
        let mut cursor = self;
        while let Some(next) = cursor.descendant.as_deref() {
            path.push(next);
            cursor = next;
        }
        path
    }
}

/// What an exclude filter removes when it matches a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludeScope {
    /// Remove the matching node and its entire subtree
    #[default]
    Subtree,
    /// Keep the matching node but stop descent into its children
    Children,
}

/// Prunes nodes from a materialized tree
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    pub tag_name: String,
    pub attributes: Option<AttrFilter>,
    pub scope: ExcludeScope,
}

impl ExcludeFilter {
    pub fn subtree(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
            scope: ExcludeScope::Subtree,
        }
    }

    pub fn children(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
            scope: ExcludeScope::Children,
        }
    }

    pub fn with_attributes(mut self, attrs: AttrFilter) -> Self {
        self.attributes = Some(attrs);
        self
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        record.tag_name == self.tag_name
            && self
                .attributes
                .as_ref()
                .map(|a| a.matches(record))
                .unwrap_or(true)
    }
}

/// Keeps only matching branches of a materialized tree
///
/// Mirrored against live children level by level: a child is kept only if
/// it matches one of the active branches (first match wins); the matched
/// branch's own `children` filter the kept child's children, and a branch
/// without nested branches leaves the subtree below unfiltered.
#[derive(Debug, Clone)]
pub struct IncludeFilter {
    pub tag_name: String,
    pub attributes: Option<AttrFilter>,
    pub children: Vec<IncludeFilter>,
}

impl IncludeFilter {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attrs: AttrFilter) -> Self {
        self.attributes = Some(attrs);
        self
    }

    pub fn with_child(mut self, branch: IncludeFilter) -> Self {
        self.children.push(branch);
        self
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        record.tag_name == self.tag_name
            && self
                .attributes
                .as_ref()
                .map(|a| a.matches(record))
                .unwrap_or(true)
    }
}

/// The three tree filters of a `get_tree` call
///
/// Excludes are evaluated before include-matching at each level; unwrap
/// runs as a post-processing pass over the already-built tree.
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    pub include: Option<IncludeFilter>,
    pub exclude: Vec<ExcludeFilter>,
    pub unwrap: HashSet<String>,
}

impl TreeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, filter: IncludeFilter) -> Self {
        self.include = Some(filter);
        self
    }

    pub fn exclude(mut self, filter: ExcludeFilter) -> Self {
        self.exclude.push(filter);
        self
    }

    pub fn unwrap_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.unwrap.insert(tag_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn record() -> Record {
        let mut r = Record::new("r-1", "LN");
        r.set_attribute(Attribute::new("lnClass", "XCBR"));
        r.set_attribute(Attribute::new("inst", "1"));
        r
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(AttrFilter::new().matches(&record()));
    }

    #[test]
    fn test_all_supplied_names_must_match() {
        let both = AttrFilter::new().eq("lnClass", "XCBR").eq("inst", "1");
        assert!(both.matches(&record()));

        let wrong = AttrFilter::new().eq("lnClass", "XCBR").eq("inst", "2");
        assert!(!wrong.matches(&record()));
    }

    #[test]
    fn test_missing_attribute_never_matches() {
        let filter = AttrFilter::new().eq("prefix", "Q0");
        assert!(!filter.matches(&record()));
    }

    #[test]
    fn test_value_list_is_or() {
        let filter = AttrFilter::new().one_of("lnClass", ["CSWI", "XCBR"]);
        assert!(filter.matches(&record()));

        let none = AttrFilter::new().one_of("lnClass", ["CSWI", "MMXU"]);
        assert!(!none.matches(&record()));
    }

    #[test]
    fn test_descendant_filter_flattens_shallowest_first() {
        let filter = DescendantFilter::new("IED")
            .with_descendant(DescendantFilter::new("LDevice").with_descendant(DescendantFilter::new("LN")));

        let tags: Vec<&str> = filter.flatten().iter().map(|f| f.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["IED", "LDevice", "LN"]);
    }
}
