//! In-memory catalog index: grouping and lookup over the loaded lessons.
//!
//! The index holds one generation of the catalog at a time (replaced
//! wholesale on refresh, never merged) and answers derived-view queries
//! with deterministic ordering. None of its operations fail; absent data
//! yields empty collections or `None`.

use indexmap::IndexMap;

use crate::lesson::Lesson;

/// Fallback grouping key for lessons with no Hebrew month-year.
pub const UNKNOWN_MONTH_KEY: &str = "לא ידוע";

/// Read index over the current lesson catalog.
///
/// One instance per process; a single writer replaces the catalog and any
/// number of readers query groupings. Grouping keys are listed in order of
/// first appearance in the catalog (not sorted), and lessons within a group
/// are sorted newest-first with a stable tie-break that preserves original
/// catalog order.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    lessons: Vec<Lesson>,
    loaded: bool,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap the held catalog for `lessons`.
    ///
    /// Duplicate ids are not validated here; lookups return the first match.
    pub fn replace(&mut self, lessons: Vec<Lesson>) {
        self.lessons = lessons;
        self.loaded = true;
    }

    /// All lessons in original input order.
    pub fn all(&self) -> &[Lesson] {
        &self.lessons
    }

    /// `true` once [`replace`](Self::replace) has been called at least once.
    ///
    /// Distinguishes "empty catalog" from "not yet fetched".
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Distinct topics in order of first appearance.
    pub fn topics(&self) -> Vec<&str> {
        let mut seen = IndexMap::new();
        for lesson in &self.lessons {
            seen.entry(lesson.topic.as_str()).or_insert(());
        }
        seen.into_keys().collect()
    }

    /// Lessons grouped by topic, newest first within each group.
    pub fn by_topic(&self) -> IndexMap<String, Vec<&Lesson>> {
        let mut map: IndexMap<String, Vec<&Lesson>> = IndexMap::new();
        for lesson in &self.lessons {
            map.entry(lesson.topic.clone()).or_default().push(lesson);
        }
        sort_groups_newest_first(&mut map);
        map
    }

    /// Distinct Hebrew month-year keys in order of first appearance.
    ///
    /// Lessons with an empty key are excluded from this list (they still
    /// appear in [`by_hebrew_month`](Self::by_hebrew_month) under the
    /// fallback key).
    pub fn hebrew_month_years(&self) -> Vec<&str> {
        let mut seen = IndexMap::new();
        for lesson in &self.lessons {
            if !lesson.hebrew_month_year.is_empty() {
                seen.entry(lesson.hebrew_month_year.as_str()).or_insert(());
            }
        }
        seen.into_keys().collect()
    }

    /// Lessons grouped by Hebrew month-year, newest first within each group.
    ///
    /// Lessons missing the key are bucketed under [`UNKNOWN_MONTH_KEY`].
    pub fn by_hebrew_month(&self) -> IndexMap<String, Vec<&Lesson>> {
        let mut map: IndexMap<String, Vec<&Lesson>> = IndexMap::new();
        for lesson in &self.lessons {
            let key = if lesson.hebrew_month_year.is_empty() {
                UNKNOWN_MONTH_KEY.to_string()
            } else {
                lesson.hebrew_month_year.clone()
            };
            map.entry(key).or_default().push(lesson);
        }
        sort_groups_newest_first(&mut map);
        map
    }

    /// Find a lesson by id. First match wins if ids are duplicated.
    pub fn find(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }
}

/// Sort every group by date descending.
///
/// `sort_by` is stable, so lessons sharing a date keep their original
/// catalog order. That stability is part of the contract, not incidental.
fn sort_groups_newest_first(map: &mut IndexMap<String, Vec<&Lesson>>) {
    for group in map.values_mut() {
        group.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
