mod auth;
mod course;
mod ids;
mod profile;
pub mod progress;
mod role;

pub use ids::{CourseId, EmptyIdError, ProjectId, SectionId, UserId};

pub use auth::{AuthUser, Credentials, CredentialsError};
pub use course::{Course, CourseDraft, CourseError, Project, ValidatedCourse};
pub use profile::{Profile, normalize_full_name};
pub use progress::{
    ProgressRecord, SectionRecord, completion_percentage, dedupe_sections, normalize_sections,
};
pub use role::Role;
