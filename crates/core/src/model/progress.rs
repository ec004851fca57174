use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::model::ids::{CourseId, ProjectId, SectionId, UserId};

//
// ─── SECTION RECORDS ───────────────────────────────────────────────────────────
//

/// Completion state of a single section within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    id: SectionId,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl SectionRecord {
    /// Creates a section record with no title.
    #[must_use]
    pub fn new(id: SectionId, completed: bool) -> Self {
        Self {
            id,
            completed,
            title: None,
        }
    }

    /// Attaches a display title; blank titles are dropped.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        };
        self
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Normalizes raw persisted section data into validated records.
///
/// Absent, null, or non-array input yields an empty set. Entries that are
/// not objects, that lack a string `id` or a boolean `completed`, or that
/// repeat an id already seen are dropped. Normalizing the serialized output
/// of this function returns the same records.
#[must_use]
pub fn normalize_sections(raw: Option<&Value>) -> Vec<SectionRecord> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(object) = entry.as_object() else {
            continue;
        };
        let Some(raw_id) = object.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(completed) = object.get("completed").and_then(Value::as_bool) else {
            continue;
        };
        let Ok(id) = SectionId::new(raw_id) else {
            continue;
        };
        if !seen.insert(id.as_str().to_owned()) {
            continue;
        }

        let mut record = SectionRecord::new(id, completed);
        if let Some(title) = object.get("title").and_then(Value::as_str) {
            record = record.with_title(title);
        }
        records.push(record);
    }
    records
}

/// Drops every section after the first occurrence of its id.
#[must_use]
pub fn dedupe_sections(sections: Vec<SectionRecord>) -> Vec<SectionRecord> {
    let mut seen = HashSet::with_capacity(sections.len());
    sections
        .into_iter()
        .filter(|section| seen.insert(section.id().as_str().to_owned()))
        .collect()
}

//
// ─── COMPLETION PERCENTAGE ─────────────────────────────────────────────────────
//

/// Share of sections marked complete, as a whole-number percentage.
///
/// A declared total of zero yields 0. Completed counts beyond the declared
/// total clamp to 100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn completion_percentage(sections: &[SectionRecord], total_sections: u32) -> u8 {
    if total_sections == 0 {
        return 0;
    }
    let completed = sections.iter().filter(|s| s.completed()).count();
    let percent = completed as f64 * 100.0 / f64::from(total_sections);
    percent.round().clamp(0.0, 100.0) as u8
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Stored progress of one learner on one project.
///
/// `sections` is `None` until the learner first submits progress for the
/// project; absence is the ordinary "not started" state. The
/// `project_completed` flag is an authoritative course-completion signal
/// written by the backend and is never derived from the section set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    user_id: UserId,
    project_id: ProjectId,
    course_id: CourseId,
    sections: Option<Vec<SectionRecord>>,
    project_completed: bool,
    last_accessed: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Rebuilds a record from persisted parts.
    ///
    /// Duplicate section ids collapse to their first occurrence so the
    /// record upholds the unique-id invariant regardless of what the
    /// backend returned.
    #[must_use]
    pub fn from_persisted(
        user_id: UserId,
        project_id: ProjectId,
        course_id: CourseId,
        sections: Option<Vec<SectionRecord>>,
        project_completed: bool,
        last_accessed: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            project_id,
            course_id,
            sections: sections.map(dedupe_sections),
            project_completed,
            last_accessed,
            updated_at,
        }
    }

    // Accessors
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn sections(&self) -> Option<&[SectionRecord]> {
        self.sections.as_deref()
    }

    #[must_use]
    pub fn last_accessed(&self) -> Option<DateTime<Utc>> {
        self.last_accessed
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// True once the learner has submitted progress at least once.
    #[must_use]
    pub fn started(&self) -> bool {
        self.sections.is_some()
    }

    /// Number of sections the learner has marked complete.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.sections
            .as_deref()
            .map_or(0, |sections| sections.iter().filter(|s| s.completed()).count())
    }

    /// Completion percentage against the project's declared section count.
    #[must_use]
    pub fn percent_complete(&self, total_sections: u32) -> u8 {
        completion_percentage(self.sections.as_deref().unwrap_or_default(), total_sections)
    }

    /// The authoritative course-level completion flag.
    ///
    /// Returns exactly the stored value; section state is never consulted.
    #[must_use]
    pub fn is_project_complete(&self) -> bool {
        self.project_completed
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
