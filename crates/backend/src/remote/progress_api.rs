use lms_core::model::{ProgressRecord, ProjectId, UserId};

use super::dto::{ProgressRow, ProgressUpsertRow};
use super::{RemoteBackend, decode, response_error, transport};
use crate::contract::{BackendError, ProgressStore, ProgressUpsert};

#[async_trait::async_trait]
impl ProgressStore for RemoteBackend {
    async fn fetch_progress(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProgressRecord>, BackendError> {
        let project_filter = format!("eq.{project_id}");
        let user_filter = format!("eq.{user_id}");
        let request = self.client.get(self.rest_url("user_progress")).query(&[
            ("select", "*"),
            ("project_id", project_filter.as_str()),
            ("user_id", user_filter.as_str()),
            ("limit", "1"),
        ]);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let rows: Vec<ProgressRow> = response.json().await.map_err(decode)?;
        rows.into_iter().next().map(ProgressRow::into_record).transpose()
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), BackendError> {
        let payload = ProgressUpsertRow::from_upsert(upsert);
        let request = self
            .client
            .post(self.rest_url("user_progress"))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }
        Ok(())
    }
}
