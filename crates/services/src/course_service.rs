use std::sync::Arc;

use backend::{CourseCatalog, NewCourseRecord};
use lms_core::model::{Course, CourseDraft, CourseId, UserId};

use crate::error::CourseServiceError;

/// Orchestrates course authoring and catalog reads.
#[derive(Clone)]
pub struct CourseService {
    catalog: Arc<dyn CourseCatalog>,
}

impl CourseService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CourseCatalog>) -> Self {
        Self { catalog }
    }

    /// Create a new course owned by the given user and persist it.
    ///
    /// New courses start unpublished.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` for validation failures.
    /// Returns `CourseServiceError::Backend` if persistence fails.
    pub async fn create_course(
        &self,
        owner_id: &UserId,
        name: String,
        description: Option<String>,
    ) -> Result<CourseId, CourseServiceError> {
        let fields = CourseDraft::new(name, description).validate()?;
        let record = NewCourseRecord::from_validated(owner_id.clone(), fields);
        let course_id = self.catalog.insert_course(record).await?;
        Ok(course_id)
    }

    /// List every course with its projects.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Backend` if the catalog read fails.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self.catalog.list_courses().await?;
        Ok(courses)
    }

    /// Fetch a course by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Backend` if the catalog read fails.
    pub async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CourseServiceError> {
        let course = self.catalog.get_course(id).await?;
        Ok(course)
    }

    /// Update a course's name and description.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` if validation fails.
    /// Returns `CourseServiceError::Backend` if the course is missing or
    /// the write fails.
    pub async fn update_course(
        &self,
        id: &CourseId,
        name: String,
        description: Option<String>,
    ) -> Result<(), CourseServiceError> {
        let fields = CourseDraft::new(name, description).validate()?;
        self.catalog.update_course(id, fields).await?;
        Ok(())
    }
}
