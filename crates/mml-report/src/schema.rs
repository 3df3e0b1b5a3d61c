//! Column-set accumulation for the concept table.
//!
//! The concept table's columns are not fixed: the dynamic wide columns
//! (semantic-type and coding-source flags) only exist once a record carrying
//! them has been seen. The schema value is owned by the run that builds it
//! and threaded explicitly through discovery and writing; there is no
//! process-wide column registry.

use std::collections::HashSet;

use mml_model::ConceptRecord;

/// Ordered, de-duplicated column-name accumulator.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl FieldSchema {
    /// Schema seeded with the default concept columns.
    pub fn new() -> Self {
        let mut schema = Self {
            names: Vec::new(),
            seen: HashSet::new(),
        };
        for name in ConceptRecord::DEFAULT_FIELDNAMES {
            schema.push(name);
        }
        schema
    }

    /// Append a column if it is not already present.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.seen.insert(name.clone()) {
            self.names.push(name);
        }
    }

    /// Append every column the record would populate.
    pub fn observe(&mut self, record: &ConceptRecord) {
        for name in record.field_names() {
            self.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Columns in output order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_default_columns() {
        let schema = FieldSchema::new();
        assert_eq!(schema.names()[0], "event_id");
        assert!(schema.contains("cui"));
        assert_eq!(schema.len(), ConceptRecord::DEFAULT_FIELDNAMES.len());
    }

    #[test]
    fn observe_appends_once_in_first_seen_order() {
        let mut schema = FieldSchema::new();
        let mut record = ConceptRecord::default();
        record.set_extra("idcn", 1i64);
        schema.observe(&record);
        schema.observe(&record);
        let extras: Vec<&String> = schema
            .names()
            .iter()
            .filter(|name| !ConceptRecord::DEFAULT_FIELDNAMES.contains(&name.as_str()))
            .collect();
        assert_eq!(extras, ["end", "semantictype", "negated", "idcn"]);
    }
}
