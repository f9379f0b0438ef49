use serde::{Deserialize, Serialize};

use super::record::Record;

/// Lifecycle status of a record relative to the staged-operation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Created,
    Updated,
    Deleted,
    Unchanged,
}

/// A record tagged with its lifecycle status
///
/// Structurally derived from [`Record`], never independently authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub record: Record,
    pub status: RecordStatus,
}

impl StatusRecord {
    pub fn new(record: Record, status: RecordStatus) -> Self {
        Self { record, status }
    }

    pub fn unchanged(record: Record) -> Self {
        Self::new(record, RecordStatus::Unchanged)
    }

    /// Drop the status, yielding the canonical record
    pub fn into_record(self) -> Record {
        self.record
    }
}

impl From<StatusRecord> for Record {
    fn from(sr: StatusRecord) -> Self {
        sr.record
    }
}

impl From<Record> for StatusRecord {
    fn from(record: Record) -> Self {
        StatusRecord::unchanged(record)
    }
}

/// A status-tagged record plus its materialized, ordered subtree
///
/// Used only as a query result, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub record: Record,
    pub status: RecordStatus,
    pub tree: Vec<TreeRecord>,
}

impl TreeRecord {
    pub fn leaf(record: Record, status: RecordStatus) -> Self {
        Self {
            record,
            status,
            tree: Vec::new(),
        }
    }

    /// Drop the subtree, yielding the status-tagged record
    pub fn into_status_record(self) -> StatusRecord {
        StatusRecord::new(self.record, self.status)
    }

    /// Depth-first flattening of the subtree, excluding this node
    pub fn descendants(&self) -> Vec<&TreeRecord> {
        let mut out = Vec::new();
        for child in &self.tree {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }
}

impl From<TreeRecord> for StatusRecord {
    fn from(tr: TreeRecord) -> Self {
        tr.into_status_record()
    }
}

impl From<StatusRecord> for TreeRecord {
    fn from(sr: StatusRecord) -> Self {
        TreeRecord::leaf(sr.record, sr.status)
    }
}

impl From<TreeRecord> for Record {
    fn from(tr: TreeRecord) -> Self {
        tr.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn sample_record() -> Record {
        let mut record = Record::new("r-1", "Substation");
        record.set_attribute(Attribute::new("name", "S1"));
        record.value = "text".to_string();
        record
    }

    #[test]
    fn test_status_round_trip_drops_exactly_status() {
        let record = sample_record();
        let tagged = StatusRecord::new(record.clone(), RecordStatus::Updated);
        let back: Record = tagged.into();
        assert_eq!(back, record);
    }

    #[test]
    fn test_tree_round_trip_drops_exactly_status_and_tree() {
        let record = sample_record();
        let mut tree = TreeRecord::leaf(record.clone(), RecordStatus::Created);
        tree.tree
            .push(TreeRecord::leaf(Record::new("c-1", "VoltageLevel"), RecordStatus::Unchanged));

        let tagged: StatusRecord = tree.clone().into();
        assert_eq!(tagged.record, record);
        assert_eq!(tagged.status, RecordStatus::Created);

        let back: Record = tree.into();
        assert_eq!(back, record);
    }

    #[test]
    fn test_conversions_are_idempotent() {
        let tagged = StatusRecord::new(sample_record(), RecordStatus::Unchanged);
        let again = StatusRecord::new(tagged.record.clone(), tagged.status);
        assert_eq!(tagged, again);
    }

    #[test]
    fn test_descendants_flatten_depth_first() {
        let mut root = TreeRecord::leaf(Record::new("r", "SCL"), RecordStatus::Unchanged);
        let mut a = TreeRecord::leaf(Record::new("a", "IED"), RecordStatus::Unchanged);
        a.tree
            .push(TreeRecord::leaf(Record::new("aa", "AccessPoint"), RecordStatus::Unchanged));
        root.tree.push(a);
        root.tree
            .push(TreeRecord::leaf(Record::new("b", "IED"), RecordStatus::Unchanged));

        let ids: Vec<&str> = root.descendants().iter().map(|n| n.record.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "aa", "b"]);
    }
}
