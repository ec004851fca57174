use lms_core::model::{AuthUser, Credentials};

use super::dto::{AuthUserRow, CredentialsBody, SessionRow};
use super::{RemoteBackend, decode, response_error, transport};
use crate::contract::{BackendError, IdentityProvider};

impl RemoteBackend {
    async fn open_session(
        &self,
        url: String,
        credentials: &Credentials,
    ) -> Result<AuthUser, BackendError> {
        let payload = CredentialsBody {
            email: credentials.email().to_owned(),
            password: credentials.password().to_owned(),
        };
        let request = self.client.post(url).json(&payload);
        let response = self.authed(request).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let session: SessionRow = response.json().await.map_err(decode)?;
        let (token, user) = session.into_parts()?;
        if token.is_some() {
            self.store_token(token);
        }
        Ok(user)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for RemoteBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        if self.session_token().is_none() {
            return Ok(None);
        }

        let request = self.client.get(self.auth_url("user"));
        let response = self.authed(request).send().await.map_err(transport)?;
        // A stale token reads as signed-out, not as a failure.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.store_token(None);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let row: AuthUserRow = response.json().await.map_err(decode)?;
        row.into_user().map(Some)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, BackendError> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        self.open_session(url, credentials).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, BackendError> {
        self.open_session(self.auth_url("signup"), credentials).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if self.session_token().is_none() {
            return Ok(());
        }

        let request = self.client.post(self.auth_url("logout"));
        let response = self.authed(request).send().await.map_err(transport)?;
        // The local session ends either way; the platform may still hold
        // one if the call failed.
        self.store_token(None);
        if !response.status().is_success() && response.status() != reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(response_error(response).await);
        }
        Ok(())
    }
}
