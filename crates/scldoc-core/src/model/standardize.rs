use uuid::Uuid;

use super::record::{Attribute, Namespace, Record};
use crate::config::DocConfig;

/// Partial input from which a canonical record is standardized
#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub id: Option<String>,
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub value: Option<String>,
    pub namespace: Option<Namespace>,
}

impl RecordInput {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Produce a canonical record from partial input
///
/// Generates a UUID v7 id when absent. For tags known to the configuration,
/// attributes are resolved against the schema: required attributes absent
/// from the input get their configured default (empty string when none),
/// optional absent attributes are omitted, and the result is ordered per
/// the configured attribute sequence; input attributes unknown to the
/// schema are appended verbatim afterwards. The configured namespace is
/// assigned. Unknown tags pass attributes and namespace through verbatim.
/// The `after_standardized` hook, when configured, may rewrite the result.
pub fn standardize(input: RecordInput, config: &DocConfig) -> Record {
    let id = input
        .id
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let mut record = Record::new(id, input.tag_name);
    record.value = input.value.unwrap_or_default();

    match config.tag(&record.tag_name) {
        Some(schema) => {
            for spec in &schema.attributes {
                match input.attributes.iter().find(|a| a.name == spec.name) {
                    Some(given) => record.attributes.push(Attribute {
                        name: spec.name.clone(),
                        value: given.value.clone(),
                        namespace: spec.namespace.clone(),
                    }),
                    None if spec.required => record.attributes.push(Attribute {
                        name: spec.name.clone(),
                        value: spec.default.clone().unwrap_or_default(),
                        namespace: spec.namespace.clone(),
                    }),
                    None => {}
                }
            }
            // Extension attributes the grammar does not know keep input order
            for given in &input.attributes {
                if schema.attribute(&given.name).is_none() {
                    record.attributes.push(given.clone());
                }
            }
            record.namespace = schema.namespace.clone();
        }
        None => {
            record.attributes = input.attributes;
            record.namespace = input.namespace;
        }
    }

    match &config.hooks.after_standardized {
        Some(hook) => hook(record),
        None => record,
    }
}
