use std::collections::HashMap;

use crate::data::model::SanitizedRecord;

/// In-memory store of sanitized readings keyed by identifier.
///
/// Entries only arrive as [`SanitizedRecord`]s and are never evicted; the
/// store lives as long as its owner.
#[derive(Debug, Default)]
pub struct Vault {
    records: HashMap<String, Vec<f64>>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Store a sanitized record, replacing any previous entry for its id.
    pub fn insert(&mut self, record: SanitizedRecord) {
        let (id, vitals) = record.into_parts();
        self.records.insert(id, vitals);
    }

    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.records.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
