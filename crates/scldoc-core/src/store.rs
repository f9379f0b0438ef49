//! Store accessor boundary and the in-memory reference implementation

use tracing::info;

use crate::config::DocConfig;
use crate::errors::{DocError, Result};
use crate::filter::AttrFilter;
use crate::model::{standardize, Record, RecordInput};

/// Abstraction over the persistent table holding the document's records
///
/// Point lookups, equality-filtered scans, bulk writes, and an atomic
/// multi-write transaction. The engine assumes all-or-nothing semantics
/// from `transaction`; partial application is a store defect.
pub trait StoreAccessor {
    /// Fetch one record by tag and id
    fn get(&self, tag_name: &str, id: &str) -> Result<Option<Record>>;

    /// All records of a tag, optionally equality-filtered on attributes,
    /// in stable storage order
    fn scan(&self, tag_name: &str, equals: Option<&AttrFilter>) -> Result<Vec<Record>>;

    /// Insert records; an already-present id is an error
    fn bulk_add(&mut self, records: &[Record]) -> Result<()>;

    /// Insert or replace records
    fn bulk_put(&mut self, records: &[Record]) -> Result<()>;

    /// Remove records by id; absent ids are ignored
    fn bulk_delete(&mut self, ids: &[String]) -> Result<()>;

    /// Run `f` atomically: either every write inside is applied, or none
    fn transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn StoreAccessor) -> Result<()>,
    ) -> Result<()>;
}

/// Create the document root once, when the store is first initialized
///
/// The root is the only record created outside staged operations. No-ops
/// (returning the existing row) when a root record is already present.
pub fn init_root<S: StoreAccessor>(store: &mut S, config: &DocConfig) -> Result<Record> {
    if let Some(existing) = store.scan(&config.root_tag, None)?.into_iter().next() {
        return Ok(existing);
    }

    let root = standardize(RecordInput::new(config.root_tag.clone()), config);
    store.bulk_add(std::slice::from_ref(&root))?;
    info!(tag = %root.tag_name, id = %root.id, "initialized document root");
    Ok(root)
}

/// In-memory store, the reference `StoreAccessor` implementation
///
/// A flat ordered row list; fine for tests and small documents. Not
/// thread-safe, matching the single-chain cooperative model.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    rows: Vec<Record>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fetch by id alone, ignoring tags (test helper)
    pub fn get_raw(&self, id: &str) -> Option<&Record> {
        self.rows.iter().find(|r| r.id == id)
    }
}

impl StoreAccessor for MemStore {
    fn get(&self, tag_name: &str, id: &str) -> Result<Option<Record>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.id == id && r.tag_name == tag_name)
            .cloned())
    }

    fn scan(&self, tag_name: &str, equals: Option<&AttrFilter>) -> Result<Vec<Record>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.tag_name == tag_name)
            .filter(|r| equals.map(|f| f.matches(r)).unwrap_or(true))
            .cloned()
            .collect())
    }

    fn bulk_add(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            if self.rows.iter().any(|r| r.id == record.id) {
                return Err(DocError::Store {
                    message: format!("duplicate id on bulk_add: {}", record.id),
                });
            }
            self.rows.push(record.clone());
        }
        Ok(())
    }

    fn bulk_put(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            match self.rows.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => self.rows.push(record.clone()),
            }
        }
        Ok(())
    }

    fn bulk_delete(&mut self, ids: &[String]) -> Result<()> {
        self.rows.retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    fn transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn StoreAccessor) -> Result<()>,
    ) -> Result<()> {
        // Scratch copy, swapped in only when the closure succeeds
        let mut scratch = self.clone();
        f(&mut scratch)?;
        *self = scratch;
        Ok(())
    }
}
