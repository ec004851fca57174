use url::Url;

use super::{RemoteBackend, response_error, transport};
use crate::contract::{AvatarStore, BackendError};

const AVATAR_BUCKET: &str = "avatars";

#[async_trait::async_trait]
impl AvatarStore for RemoteBackend {
    async fn upload(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Url, BackendError> {
        let request = self
            .client
            .post(self.object_url(AVATAR_BUCKET, object_key))
            // Overwrite instead of failing on re-upload.
            .header("x-upsert", "true")
            .header("Content-Type", content_type.to_owned())
            .body(bytes);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        Url::parse(&self.public_object_url(AVATAR_BUCKET, object_key))
            .map_err(|e| BackendError::Serialization(e.to_string()))
    }

    async fn remove(&self, object_key: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.object_url(AVATAR_BUCKET, object_key));
        let response = self.authed(request).send().await.map_err(transport)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }
        Ok(())
    }
}
