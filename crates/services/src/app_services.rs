use std::sync::Arc;

use backend::{Backend, RemoteConfig};
use lms_core::Clock;

use crate::access_service::AccessService;
use crate::auth_service::AuthService;
use crate::course_service::CourseService;
use crate::dashboard_service::DashboardService;
use crate::profile_service::ProfileService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one backend.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthService>,
    access: Arc<AccessService>,
    courses: Arc<CourseService>,
    dashboard: Arc<DashboardService>,
    profile: Arc<ProfileService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Builds services over an already constructed backend.
    #[must_use]
    pub fn new(backend: &Backend, clock: Clock) -> Self {
        let auth = Arc::new(AuthService::new(Arc::clone(&backend.identity)));
        let access = Arc::new(AccessService::new(Arc::clone(&backend.access)));
        let courses = Arc::new(CourseService::new(Arc::clone(&backend.catalog)));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&backend.catalog),
            Arc::clone(&backend.progress),
        ));
        let profile = Arc::new(ProfileService::new(
            clock,
            Arc::clone(&backend.profiles),
            Arc::clone(&backend.avatars),
        ));
        let progress = Arc::new(ProgressService::new(Arc::clone(&backend.progress)));

        Self {
            auth,
            access,
            courses,
            dashboard,
            profile,
            progress,
        }
    }

    /// Builds services over the in-memory backend, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(&Backend::in_memory(), clock)
    }

    /// Builds services over the hosted backend.
    #[must_use]
    pub fn remote(config: RemoteConfig, clock: Clock) -> Self {
        Self::new(&Backend::remote(config), clock)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn access(&self) -> Arc<AccessService> {
        Arc::clone(&self.access)
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
