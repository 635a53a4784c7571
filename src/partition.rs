//! Splits a flat grade history into per-semester buckets.

use std::collections::HashMap;

use crate::records::{GradeRecord, SemesterKey};

/// Semester buckets in the order their keys first appear in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterPartition {
    keys: Vec<SemesterKey>,
    buckets: Vec<Vec<GradeRecord>>,
}

impl SemesterPartition {
    pub fn keys(&self) -> &[SemesterKey] {
        &self.keys
    }

    pub fn bucket(&self, key: &SemesterKey) -> Option<&[GradeRecord]> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .map(|idx| self.buckets[idx].as_slice())
    }

    /// Iterates `(key, rows)` pairs in partition order.
    pub fn iter(&self) -> impl Iterator<Item = (&SemesterKey, &[GradeRecord])> {
        self.keys
            .iter()
            .zip(self.buckets.iter().map(Vec::as_slice))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

pub fn partition(records: Vec<GradeRecord>) -> SemesterPartition {
    let mut slots: HashMap<SemesterKey, usize> = HashMap::new();
    let mut result = SemesterPartition::default();
    for record in records {
        let key = record.semester_key();
        let slot = *slots.entry(key).or_insert_with(|| {
            result.keys.push(key);
            result.buckets.push(Vec::new());
            result.keys.len() - 1
        });
        result.buckets[slot].push(record);
    }
    result
}
