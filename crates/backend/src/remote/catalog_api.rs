use lms_core::model::{Course, CourseId, ValidatedCourse};

use super::dto::{CourseFieldsRow, CourseRow, NewCourseRow};
use super::{RemoteBackend, decode, response_error, transport};
use crate::contract::{BackendError, CourseCatalog, NewCourseRecord};

/// Embedded-resource selection so one read carries each course's projects.
const COURSE_SELECT: &str = "*,projects(id,name,total_sections)";

#[async_trait::async_trait]
impl CourseCatalog for RemoteBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError> {
        let request = self
            .client
            .get(self.rest_url("courses"))
            .query(&[("select", COURSE_SELECT), ("order", "created_at.asc")]);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let rows: Vec<CourseRow> = response.json().await.map_err(decode)?;
        rows.into_iter().map(CourseRow::into_course).collect()
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, BackendError> {
        let id_filter = format!("eq.{id}");
        let request = self.client.get(self.rest_url("courses")).query(&[
            ("select", COURSE_SELECT),
            ("id", id_filter.as_str()),
            ("limit", "1"),
        ]);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let rows: Vec<CourseRow> = response.json().await.map_err(decode)?;
        rows.into_iter().next().map(CourseRow::into_course).transpose()
    }

    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, BackendError> {
        let payload = NewCourseRow::from_record(record);
        let request = self
            .client
            .post(self.rest_url("courses"))
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let rows: Vec<CourseRow> = response.json().await.map_err(decode)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            BackendError::Serialization("insert returned no representation".into())
        })?;
        Ok(row.into_course()?.id().clone())
    }

    async fn update_course(
        &self,
        id: &CourseId,
        fields: ValidatedCourse,
    ) -> Result<(), BackendError> {
        let payload = CourseFieldsRow {
            name: fields.name,
            description: fields.description,
        };
        let id_filter = format!("eq.{id}");
        let request = self
            .client
            .patch(self.rest_url("courses"))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        // An update that matched no row comes back as an empty set.
        let rows: Vec<CourseRow> = response.json().await.map_err(decode)?;
        if rows.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}
