#![forbid(unsafe_code)]

pub mod access_service;
pub mod app_services;
pub mod auth_service;
pub mod course_service;
pub mod dashboard_service;
pub mod error;
pub mod profile_service;
pub mod progress_service;

pub use lms_core::Clock;

pub use error::{
    AuthError, AvatarError, CourseServiceError, DashboardError, ProfileServiceError, ProgressError,
};

pub use access_service::AccessService;
pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use course_service::CourseService;
pub use dashboard_service::{DashboardService, DashboardStats};
pub use profile_service::ProfileService;
pub use progress_service::{ProgressOverview, ProgressService};
