//! Shared error types for the services crate.

use thiserror::Error;

use backend::BackendError;
use lms_core::model::{CourseError, CredentialsError};

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `ProfileService` for profile reads and writes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `ProfileService` for avatar uploads and removal.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AvatarError {
    #[error("avatar file name must carry an extension")]
    MissingExtension,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}
