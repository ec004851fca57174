use lms_core::model::{Role, UserId};
use serde::Serialize;

use super::{RemoteBackend, decode, response_error, transport};
use crate::contract::{AccessControl, BackendError};

#[derive(Debug, Serialize)]
struct HasRoleArgs {
    user_id: String,
    role: &'static str,
}

#[async_trait::async_trait]
impl AccessControl for RemoteBackend {
    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError> {
        let payload = HasRoleArgs {
            user_id: user_id.as_str().to_owned(),
            role: role.as_str(),
        };
        let request = self.client.post(self.rpc_url("has_role")).json(&payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        // The RPC returns a bare JSON boolean.
        let held: bool = response.json().await.map_err(decode)?;
        Ok(held)
    }
}
