//! Direct children lookup with attribute filtering

use std::collections::HashMap;

use super::{effective_scan, Chain};
use crate::errors::Result;
use crate::filter::ChildFilter;
use crate::model::StatusRecord;
use crate::store::StoreAccessor;

impl<S: StoreAccessor> Chain<S> {
    /// Find direct children of the focus, grouped by requested tag
    ///
    /// For each requested child tag, scans all effective records of that
    /// tag (staged creates/updates layered over store rows, staged
    /// deletes excluded), keeps those whose parent is the current focus,
    /// and applies the attribute filter. Requested tags with no matches
    /// appear with empty lists.
    pub fn find_children(
        &self,
        filters: &[ChildFilter],
    ) -> Result<HashMap<String, Vec<StatusRecord>>> {
        let focus_id = &self.context.focus.record.id;
        let mut out = HashMap::new();

        for filter in filters {
            let rows = effective_scan(&self.store, &self.context.staged, &filter.tag_name, None)?
                .into_iter()
                .filter(|r| {
                    r.record
                        .parent
                        .as_ref()
                        .map(|p| &p.id == focus_id)
                        .unwrap_or(false)
                })
                .filter(|r| {
                    filter
                        .attributes
                        .as_ref()
                        .map(|a| a.matches(&r.record))
                        .unwrap_or(true)
                })
                .collect();
            out.insert(filter.tag_name.clone(), rows);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocConfig;
    use crate::filter::AttrFilter;
    use crate::model::{Attribute, Record};
    use crate::ops::StagedOp;
    use crate::store::{init_root, MemStore};

    fn fixture() -> Chain<MemStore> {
        let config = DocConfig::new("SCL");
        let mut store = MemStore::new();
        let root = init_root(&mut store, &config).unwrap();

        let mut ied1 = Record::new("i-1", "IED");
        ied1.parent = Some(root.relationship());
        ied1.set_attribute(Attribute::new("name", "IED_1"));
        ied1.set_attribute(Attribute::new("manufacturer", "A"));

        let mut ied2 = Record::new("i-2", "IED");
        ied2.parent = Some(root.relationship());
        ied2.set_attribute(Attribute::new("name", "IED_2"));
        ied2.set_attribute(Attribute::new("manufacturer", "B"));

        // belongs to someone else
        let mut stray = Record::new("i-3", "IED");
        stray.parent = Some(Record::new("other", "SCL").relationship());

        let mut root_row = root.clone();
        root_row.add_child(ied1.relationship());
        root_row.add_child(ied2.relationship());

        store.bulk_put(&[root_row]).unwrap();
        store.bulk_add(&[ied1, ied2, stray]).unwrap();
        Chain::attach(store, config).unwrap()
    }

    #[test]
    fn test_children_scoped_to_focus_parent() {
        let chain = fixture();
        let result = chain.find_children(&[ChildFilter::new("IED")]).unwrap();

        let ids: Vec<&str> = result["IED"].iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-2"]);
    }

    #[test]
    fn test_attribute_filter_and_semantics() {
        let chain = fixture();
        let filter = ChildFilter::new("IED")
            .with_attributes(AttrFilter::new().eq("name", "IED_1").eq("manufacturer", "A"));
        let result = chain.find_children(&[filter]).unwrap();
        assert_eq!(result["IED"].len(), 1);

        let contradictory = ChildFilter::new("IED")
            .with_attributes(AttrFilter::new().eq("name", "IED_1").eq("manufacturer", "B"));
        let result = chain.find_children(&[contradictory]).unwrap();
        assert!(result["IED"].is_empty());
    }

    #[test]
    fn test_attribute_filter_or_list() {
        let chain = fixture();
        let filter = ChildFilter::new("IED")
            .with_attributes(AttrFilter::new().one_of("manufacturer", ["B", "C"]));
        let result = chain.find_children(&[filter]).unwrap();
        assert_eq!(result["IED"].len(), 1);
        assert_eq!(result["IED"][0].record.id, "i-2");
    }

    #[test]
    fn test_unmatched_tag_yields_empty_entry() {
        let chain = fixture();
        let result = chain
            .find_children(&[ChildFilter::new("Substation")])
            .unwrap();
        assert!(result["Substation"].is_empty());
    }

    #[test]
    fn test_staged_delete_excluded_and_staged_create_included() {
        let mut chain = fixture();
        let gone = chain.store.get("IED", "i-1").unwrap().unwrap();
        chain.context.staged.push(StagedOp::Deleted { old: gone });

        let mut fresh = Record::new("i-9", "IED");
        fresh.parent = Some(chain.focus().record.relationship());
        chain.context.staged.push(StagedOp::Created { new: fresh });

        let result = chain.find_children(&[ChildFilter::new("IED")]).unwrap();
        let ids: Vec<&str> = result["IED"].iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["i-2", "i-9"]);
    }
}
