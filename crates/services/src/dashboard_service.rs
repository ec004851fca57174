use std::sync::Arc;

use backend::{CourseCatalog, ProgressStore};
use lms_core::model::UserId;

use crate::error::DashboardError;

/// Counts shown on the learner's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_courses: usize,
    pub completed_courses: usize,
}

/// Aggregates catalog and progress data into dashboard counts.
#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<dyn CourseCatalog>,
    progress: Arc<dyn ProgressStore>,
}

impl DashboardService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CourseCatalog>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, progress }
    }

    /// Computes the learner's dashboard counts.
    ///
    /// A course counts as completed when it has at least one project and
    /// every one of them carries the stored completion flag. A course
    /// without projects is never completed.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Backend` if the catalog or a progress read
    /// fails.
    pub async fn stats(&self, user_id: &UserId) -> Result<DashboardStats, DashboardError> {
        let courses = self.catalog.list_courses().await?;
        let total_courses = courses.len();

        let mut completed_courses = 0;
        for course in &courses {
            if course.projects().is_empty() {
                continue;
            }

            let mut every_project_done = true;
            for project in course.projects() {
                let record = self.progress.fetch_progress(project.id(), user_id).await?;
                if !record.is_some_and(|r| r.is_project_complete()) {
                    every_project_done = false;
                    break;
                }
            }
            if every_project_done {
                completed_courses += 1;
            }
        }

        Ok(DashboardStats {
            total_courses,
            completed_courses,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use backend::ProgressUpsert;
    use backend::memory::InMemoryBackend;
    use lms_core::model::{Course, CourseId, Project, ProjectId};

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn project(id: &str) -> Project {
        Project::new(ProjectId::new(id).unwrap(), "Project", 3).unwrap()
    }

    fn course(id: &str, projects: Vec<Project>) -> Course {
        Course::from_persisted(
            CourseId::new(id).unwrap(),
            "Course",
            None,
            None,
            true,
            None,
            projects,
        )
        .unwrap()
    }

    async fn start_project(backend: &InMemoryBackend, course_id: &str, project_id: &str) {
        let upsert = ProgressUpsert::new(
            user(),
            ProjectId::new(project_id).unwrap(),
            CourseId::new(course_id).unwrap(),
            Vec::new(),
        );
        backend.upsert_progress(&upsert).await.unwrap();
    }

    #[tokio::test]
    async fn empty_catalog_counts_zero() {
        let backend = InMemoryBackend::new();
        let service = DashboardService::new(Arc::new(backend.clone()), Arc::new(backend));

        let stats = service.stats(&user()).await.unwrap();
        assert_eq!(stats.total_courses, 0);
        assert_eq!(stats.completed_courses, 0);
    }

    #[tokio::test]
    async fn course_completes_only_when_every_project_does() {
        let backend = InMemoryBackend::new();
        backend
            .put_course(course("c1", vec![project("p1"), project("p2")]))
            .unwrap();
        start_project(&backend, "c1", "p1").await;
        start_project(&backend, "c1", "p2").await;
        backend
            .set_project_completed(&user(), &ProjectId::new("p1").unwrap(), true)
            .unwrap();

        let service = DashboardService::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
        let stats = service.stats(&user()).await.unwrap();
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.completed_courses, 0);

        backend
            .set_project_completed(&user(), &ProjectId::new("p2").unwrap(), true)
            .unwrap();
        let stats = service.stats(&user()).await.unwrap();
        assert_eq!(stats.completed_courses, 1);
    }

    #[tokio::test]
    async fn course_without_projects_never_completes() {
        let backend = InMemoryBackend::new();
        backend.put_course(course("c1", Vec::new())).unwrap();

        let service = DashboardService::new(Arc::new(backend.clone()), Arc::new(backend));
        let stats = service.stats(&user()).await.unwrap();
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.completed_courses, 0);
    }

    #[tokio::test]
    async fn unstarted_project_keeps_course_incomplete() {
        let backend = InMemoryBackend::new();
        backend
            .put_course(course("c1", vec![project("p1")]))
            .unwrap();

        let service = DashboardService::new(Arc::new(backend.clone()), Arc::new(backend));
        let stats = service.stats(&user()).await.unwrap();
        assert_eq!(stats.completed_courses, 0);
    }
}
