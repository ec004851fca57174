use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::model::{
    AuthUser, Course, CourseId, Credentials, Profile, ProgressRecord, ProjectId, Role,
    SectionRecord, UserId, ValidatedCourse, dedupe_sections,
};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("not found")]
    NotFound,

    #[error("not authorized")]
    Unauthorized,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The platform rejected the request. The message is the platform's
    /// own wording, passed through for user-visible reporting.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Full-replacement write for one learner's progress on one project.
///
/// Carries the complete desired section state; the stored set is replaced
/// wholesale, so the last writer wins. The course-completion flag is not
/// part of the write and keeps its stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpsert {
    user_id: UserId,
    project_id: ProjectId,
    course_id: CourseId,
    completed_sections: Vec<SectionRecord>,
}

impl ProgressUpsert {
    /// Builds an upsert, collapsing duplicate section ids to their first
    /// occurrence.
    #[must_use]
    pub fn new(
        user_id: UserId,
        project_id: ProjectId,
        course_id: CourseId,
        sections: Vec<SectionRecord>,
    ) -> Self {
        Self {
            user_id,
            project_id,
            course_id,
            completed_sections: dedupe_sections(sections),
        }
    }

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
    pub fn completed_sections(&self) -> &[SectionRecord] {
        &self.completed_sections
    }
}

/// Persisted shape for a brand-new course row.
#[derive(Debug, Clone)]
pub struct NewCourseRecord {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub is_published: bool,
}

impl NewCourseRecord {
    /// New courses start unpublished.
    #[must_use]
    pub fn from_validated(owner_id: UserId, fields: ValidatedCourse) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            owner_id,
            is_published: false,
        }
    }
}

/// Contract for per-learner progress rows, keyed by (user, project).
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the progress row for a (project, user) pair.
    ///
    /// Returns `Ok(None)` when the learner has not started the project.
    /// Absence is an ordinary state, not an error.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the read fails.
    async fn fetch_progress(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProgressRecord>, BackendError>;

    /// Replace the stored section set for the upsert's (user, project) key.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the write is rejected or fails; the stored
    /// row is then unchanged.
    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), BackendError>;
}

/// Contract for the course catalog.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// List every course together with its projects.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the read fails.
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError>;

    /// Fetch a single course by id, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the read fails.
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, BackendError>;

    /// Insert a new course and return its backend-issued id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the insert is rejected.
    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, BackendError>;

    /// Update name and description of an existing course.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the course does not exist, or
    /// another `BackendError` if the update fails.
    async fn update_course(
        &self,
        id: &CourseId,
        fields: ValidatedCourse,
    ) -> Result<(), BackendError>;
}

/// Contract for profile rows.
///
/// Updates are column-partial: each call touches only the named column
/// plus `updated_at`, creating the row if it does not exist yet.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row, or `None` for accounts that never saved one.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the read fails.
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, BackendError>;

    /// Set or clear the display name.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the write fails.
    async fn upsert_full_name(
        &self,
        user_id: &UserId,
        full_name: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError>;

    /// Set or clear the avatar URL.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the write fails.
    async fn upsert_avatar_url(
        &self,
        user_id: &UserId,
        avatar_url: Option<&Url>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError>;
}

/// Contract for the avatar object store.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Upload an object, overwriting any existing object under the same
    /// key, and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the upload fails.
    async fn upload(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Url, BackendError>;

    /// Delete an object by key.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if no such object exists, or
    /// another `BackendError` if the delete fails.
    async fn remove(&self, object_key: &str) -> Result<(), BackendError>;
}

/// Contract for the hosted identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The currently signed-in account, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the session lookup fails.
    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError>;

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` with the platform's own message if
    /// the credentials are refused.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, BackendError>;

    /// Register a new account and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` with the platform's own message if
    /// registration is refused.
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, BackendError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the platform rejects the sign-out.
    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Contract for role membership checks.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Whether the user holds the given role.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the check cannot be performed. Callers
    /// decide how to degrade; the store itself never guesses.
    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError>;
}

/// Aggregates every backend collaborator behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Backend {
    pub progress: Arc<dyn ProgressStore>,
    pub catalog: Arc<dyn CourseCatalog>,
    pub profiles: Arc<dyn ProfileStore>,
    pub avatars: Arc<dyn AvatarStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub access: Arc<dyn AccessControl>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::SectionId;

    fn section(id: &str, completed: bool) -> SectionRecord {
        SectionRecord::new(SectionId::new(id).unwrap(), completed)
    }

    #[test]
    fn upsert_collapses_duplicate_sections() {
        let upsert = ProgressUpsert::new(
            UserId::new("u1").unwrap(),
            ProjectId::new("p1").unwrap(),
            CourseId::new("c1").unwrap(),
            vec![section("a", true), section("a", false), section("b", false)],
        );
        assert_eq!(upsert.completed_sections().len(), 2);
        assert!(upsert.completed_sections()[0].completed());
    }

    #[test]
    fn new_course_record_starts_unpublished() {
        let fields = lms_core::model::CourseDraft::new("Rust Basics", None)
            .validate()
            .unwrap();
        let record = NewCourseRecord::from_validated(UserId::new("u1").unwrap(), fields);
        assert!(!record.is_published);
        assert_eq!(record.name, "Rust Basics");
    }
}
