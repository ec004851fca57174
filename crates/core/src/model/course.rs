use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CourseId, ProjectId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course name cannot be empty")]
    EmptyName,

    #[error("project name cannot be empty")]
    EmptyProjectName,
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Editable course fields as entered, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CourseDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Validates and normalizes the draft.
    ///
    /// Trims the name and description; a blank description becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyName` if the name is empty or whitespace.
    pub fn validate(self) -> Result<ValidatedCourse, CourseError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CourseError::EmptyName);
        }

        let description = self
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(ValidatedCourse {
            name: name.to_owned(),
            description,
        })
    }
}

/// Course fields that passed validation, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCourse {
    pub name: String,
    pub description: Option<String>,
}

//
// ─── PROJECT ───────────────────────────────────────────────────────────────────
//

/// A unit of work inside a course, tracked section by section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    name: String,
    total_sections: u32,
}

impl Project {
    /// Creates a new Project.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyProjectName` if the name is empty or
    /// whitespace-only.
    pub fn new(
        id: ProjectId,
        name: impl Into<String>,
        total_sections: u32,
    ) -> Result<Self, CourseError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourseError::EmptyProjectName);
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            total_sections,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared number of sections; zero means the project has not
    /// published a section plan yet.
    #[must_use]
    pub fn total_sections(&self) -> u32 {
        self.total_sections
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course as stored by the backend, together with its projects.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    name: String,
    description: Option<String>,
    owner_id: Option<UserId>,
    is_published: bool,
    created_at: Option<DateTime<Utc>>,
    projects: Vec<Project>,
}

impl Course {
    /// Rebuilds a course from persisted parts.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyName` if the stored name is empty or
    /// whitespace-only.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: CourseId,
        name: impl Into<String>,
        description: Option<String>,
        owner_id: Option<UserId>,
        is_published: bool,
        created_at: Option<DateTime<Utc>>,
        projects: Vec<Project>,
    ) -> Result<Self, CourseError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourseError::EmptyName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
            owner_id,
            is_published,
            created_at,
            projects,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_published
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Replaces name and description with validated fields.
    #[must_use]
    pub fn with_fields(mut self, fields: ValidatedCourse) -> Self {
        self.name = fields.name;
        self.description = fields.description;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
