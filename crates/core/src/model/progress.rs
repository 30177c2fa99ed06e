use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::ids::LectureId;

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Durable per-lecture viewed flag for one (student, course) pair.
///
/// `viewed` transitions from `false` to `true` exactly once per lecture;
/// the only way back is a whole-course reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub lecture_id: LectureId,
    pub viewed: bool,
    pub viewed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    #[must_use]
    pub fn unviewed(lecture_id: LectureId) -> Self {
        Self {
            lecture_id,
            viewed: false,
            viewed_at: None,
        }
    }

    #[must_use]
    pub fn viewed(lecture_id: LectureId, at: DateTime<Utc>) -> Self {
        Self {
            lecture_id,
            viewed: true,
            viewed_at: Some(at),
        }
    }
}

//
// ─── PROGRESS SET ──────────────────────────────────────────────────────────────
//

/// The progress records for the current (student, course) pair.
///
/// Lookups are tolerant: a lecture with no record reads as unviewed, and
/// records for lectures absent from the curriculum are carried without
/// complaint. Nothing here ever panics on an unknown id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSet {
    records: HashMap<LectureId, ProgressRecord>,
}

impl ProgressSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from persisted records. Later duplicates win.
    #[must_use]
    pub fn from_records(records: Vec<ProgressRecord>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            map.insert(record.lecture_id, record);
        }
        Self { records: map }
    }

    #[must_use]
    pub fn is_viewed(&self, lecture_id: LectureId) -> bool {
        self.records
            .get(&lecture_id)
            .is_some_and(|record| record.viewed)
    }

    /// Mark a lecture viewed. Returns `true` if the record changed,
    /// `false` if it was already viewed (idempotent re-marks are no-ops).
    pub fn mark_viewed(&mut self, lecture_id: LectureId, at: DateTime<Utc>) -> bool {
        match self.records.get_mut(&lecture_id) {
            Some(record) if record.viewed => false,
            Some(record) => {
                record.viewed = true;
                record.viewed_at = Some(at);
                true
            }
            None => {
                self.records
                    .insert(lecture_id, ProgressRecord::viewed(lecture_id, at));
                true
            }
        }
    }

    /// Undo an optimistic mark after a failed durable write.
    pub fn clear_viewed(&mut self, lecture_id: LectureId) {
        if let Some(record) = self.records.get_mut(&lecture_id) {
            record.viewed = false;
            record.viewed_at = None;
        }
    }

    /// Drop every record, as after a whole-course reset.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn viewed_count(&self) -> usize {
        self.records.values().filter(|record| record.viewed).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, lecture_id: LectureId) -> Option<&ProgressRecord> {
        self.records.get(&lecture_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records.values()
    }
}
