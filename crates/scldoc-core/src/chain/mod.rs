//! The chain: a handle threading a context through successive
//! navigation, query, mutation, and commit calls
//!
//! The original system threads an asynchronous context through a promise
//! chain; here the same staging semantics are an explicit value-passing
//! pipeline. Navigation and mutation consume the chain and return a new
//! one, queries borrow it, and `commit` takes it by mutable reference so
//! a rejected commit leaves the staged log available for inspection or
//! retry. A chain must not be driven from two call sites at once; the
//! engine performs no locking.

mod commit;
mod context;
mod descendants;
mod mutate;
mod navigate;
mod query;
mod tree;

pub use context::Context;
pub(crate) use context::{effective_scan, resolve, resolve_link};

use crate::config::DocConfig;
use crate::errors::{DocError, Result};
use crate::model::{StatusRecord, TreeRecord};
use crate::ops::StagedOp;
use crate::store::StoreAccessor;

/// A navigable, transactionally-staged handle over one document
///
/// Wraps the store, the document configuration, and the current
/// `Context`. Nothing touches the store for writes until [`Chain::commit`].
pub struct Chain<S: StoreAccessor> {
    pub(crate) store: S,
    pub(crate) config: DocConfig,
    pub(crate) context: Context,
}

impl<S: StoreAccessor> Chain<S> {
    /// Open a chain focused on the document root
    ///
    /// The store must already hold a root record (see
    /// [`crate::store::init_root`]).
    pub fn attach(store: S, config: DocConfig) -> Result<Self> {
        let root = store
            .scan(&config.root_tag, None)?
            .into_iter()
            .next()
            .ok_or_else(|| DocError::NotFound {
                tag_name: config.root_tag.clone(),
                id: String::new(),
            })?;
        Ok(Self {
            store,
            config,
            context: Context::new(StatusRecord::unchanged(root)),
        })
    }

    /// Open a chain focused on an arbitrary record (importer/exporter entry)
    pub fn with_focus(store: S, config: DocConfig, focus: StatusRecord) -> Self {
        Self {
            store,
            config,
            context: Context::new(focus),
        }
    }

    /// The current focus record
    pub fn focus(&self) -> &StatusRecord {
        &self.context.focus
    }

    /// The pending staged-operation log
    pub fn staged(&self) -> &[StagedOp] {
        &self.context.staged
    }

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    /// Release the underlying store (e.g. to hand it to an exporter)
    pub fn into_store(self) -> S {
        self.store
    }

    /// Materialize the current focus with its full subtree, unfiltered
    pub fn materialize(&self) -> Result<TreeRecord> {
        self.get_tree(&crate::filter::TreeQuery::default())
    }
}

impl<S: StoreAccessor> std::fmt::Debug for Chain<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("focus", &self.context.focus.record.tag_name)
            .field("focus_id", &self.context.focus.record.id)
            .field("staged_ops", &self.context.staged.len())
            .finish()
    }
}
