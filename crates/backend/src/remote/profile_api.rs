use chrono::{DateTime, Utc};
use lms_core::model::{Profile, UserId};
use url::Url;

use super::dto::{ProfileAvatarRow, ProfileNameRow, ProfileRow};
use super::{RemoteBackend, decode, response_error, transport};
use crate::contract::{BackendError, ProfileStore};

impl RemoteBackend {
    /// Column-partial profile upsert; unnamed columns keep their values.
    async fn upsert_profile<P: serde::Serialize + Sync>(
        &self,
        payload: &P,
    ) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.rest_url("profiles"))
            .header("Prefer", "resolution=merge-duplicates")
            .json(payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for RemoteBackend {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, BackendError> {
        let id_filter = format!("eq.{user_id}");
        let request = self.client.get(self.rest_url("profiles")).query(&[
            ("select", "*"),
            ("id", id_filter.as_str()),
            ("limit", "1"),
        ]);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let rows: Vec<ProfileRow> = response.json().await.map_err(decode)?;
        rows.into_iter().next().map(ProfileRow::into_profile).transpose()
    }

    async fn upsert_full_name(
        &self,
        user_id: &UserId,
        full_name: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let payload = ProfileNameRow {
            id: user_id.as_str().to_owned(),
            full_name: full_name.map(str::to_owned),
            updated_at,
        };
        self.upsert_profile(&payload).await
    }

    async fn upsert_avatar_url(
        &self,
        user_id: &UserId,
        avatar_url: Option<&Url>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let payload = ProfileAvatarRow {
            id: user_id.as_str().to_owned(),
            avatar_url: avatar_url.map(|url| url.as_str().to_owned()),
            updated_at,
        };
        self.upsert_profile(&payload).await
    }
}
