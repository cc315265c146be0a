//! Lesson entity and its ingestion-boundary DTO.
//!
//! The catalog loader hands us loosely-typed records (everything a string,
//! dates in `YYYY-MM-DD`). Those are validated once, at the boundary, into
//! the strict [`Lesson`] type the rest of the crate works with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An immutable catalog entry.
///
/// Created by the external ingestion/classification process and replaced
/// wholesale when the catalog refreshes; read-only inside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Stable external identifier, assumed unique (not enforced).
    pub id: String,
    pub title: String,
    /// Playable-media reference (player URL or embed id).
    pub media_ref: String,
    /// Publication date, used for newest-first ordering within groups.
    pub date: NaiveDate,
    /// Free-text category label.
    pub topic: String,
    /// Pre-rendered Hebrew calendar date, display only.
    pub hebrew_date: String,
    /// Hebrew month-year grouping key. May be empty when the upstream
    /// converter had nothing for this entry.
    pub hebrew_month_year: String,
}

/// Loosely-typed lesson record as delivered by the catalog loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: String,
    pub title: String,
    pub media_ref: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub topic: String,
    #[serde(default)]
    pub hebrew_date: String,
    #[serde(default)]
    pub hebrew_month_year: String,
}

impl LessonRecord {
    /// Validate this record into a [`Lesson`].
    ///
    /// Rejects empty ids and titles and dates that are not well-formed
    /// `YYYY-MM-DD`. The Hebrew display fields may be empty; the index
    /// buckets lessons without a month-year under a fallback key.
    pub fn try_into_lesson(self) -> Result<Lesson, CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Validation("Lesson id must not be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Lesson '{}' has an empty title",
                self.id
            )));
        }
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            CoreError::Validation(format!(
                "Lesson '{}' has invalid date '{}'. Expected YYYY-MM-DD",
                self.id, self.date
            ))
        })?;

        Ok(Lesson {
            id: self.id,
            title: self.title,
            media_ref: self.media_ref,
            date,
            topic: self.topic,
            hebrew_date: self.hebrew_date,
            hebrew_month_year: self.hebrew_month_year,
        })
    }
}
