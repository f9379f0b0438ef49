use serde::{Deserialize, Serialize};

/// An XML namespace binding
///
/// An empty prefix denotes the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

/// A single attribute on a record
///
/// The namespace is present only for qualified attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: None,
        }
    }
}

/// Lightweight pointer used for parent and child links
///
/// Carries just enough to resolve the referenced record through the store,
/// never the referenced record's own data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub tag_name: String,
}

/// The canonical, storable representation of one tree node
///
/// `id` is globally unique and immutable for the record's lifetime;
/// `tag_name` is immutable once the record is created. Exactly one record
/// per document may have no parent (the root). Attribute and child order
/// are significant and preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Relationship>,
    #[serde(default)]
    pub children: Vec<Relationship>,
}

impl Record {
    /// Create a bare record with no attributes, value, or links
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            namespace: None,
            attributes: Vec::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replace an attribute in place, or append it when the name is new
    ///
    /// Order of existing attributes is preserved.
    pub fn set_attribute(&mut self, attr: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.attributes.push(attr),
        }
    }

    /// The relationship pointer other records use to reference this one
    pub fn relationship(&self) -> Relationship {
        Relationship {
            id: self.id.clone(),
            tag_name: self.tag_name.clone(),
        }
    }

    /// Check if this record is the document root (has no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Append a child relationship
    pub fn add_child(&mut self, rel: Relationship) {
        self.children.push(rel);
    }

    /// Remove a child relationship by id
    pub fn remove_child(&mut self, id: &str) {
        self.children.retain(|r| r.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_root() {
        let record = Record::new("r-1", "SCL");
        assert!(record.is_root());
        assert!(record.attributes.is_empty());
        assert!(record.children.is_empty());
    }

    #[test]
    fn test_attribute_lookup() {
        let mut record = Record::new("r-1", "IED");
        record.set_attribute(Attribute::new("name", "IED_1"));

        assert_eq!(record.attribute("name"), Some("IED_1"));
        assert_eq!(record.attribute("desc"), None);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut record = Record::new("r-1", "IED");
        record.set_attribute(Attribute::new("name", "IED_1"));
        record.set_attribute(Attribute::new("type", "P645"));
        record.set_attribute(Attribute::new("name", "IED_2"));

        assert_eq!(record.attributes.len(), 2);
        assert_eq!(record.attributes[0].name, "name");
        assert_eq!(record.attribute("name"), Some("IED_2"));
    }

    #[test]
    fn test_add_remove_child() {
        let mut record = Record::new("r-1", "IED");
        let child = Record::new("c-1", "AccessPoint");

        record.add_child(child.relationship());
        assert_eq!(record.children.len(), 1);
        assert_eq!(record.children[0].tag_name, "AccessPoint");

        record.remove_child("c-1");
        assert!(record.children.is_empty());
    }
}
