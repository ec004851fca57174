use std::env;
use std::sync::{Arc, Mutex};

use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::contract::{
    AccessControl, AvatarStore, Backend, BackendError, CourseCatalog, IdentityProvider,
    ProfileStore, ProgressStore,
};

mod access_api;
mod avatar_api;
mod catalog_api;
mod dto;
mod identity_api;
mod profile_api;
mod progress_api;

/// Configuration for the hosted platform client.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteConfigError {
    #[error("invalid base URL")]
    InvalidBaseUrl,

    #[error("API key cannot be empty")]
    EmptyApiKey,
}

impl RemoteConfig {
    /// Creates a config from the platform project URL and its anon key.
    ///
    /// # Errors
    ///
    /// Returns `RemoteConfigError` if the URL does not parse or the key is
    /// blank.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RemoteConfigError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| RemoteConfigError::InvalidBaseUrl)?;
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(RemoteConfigError::EmptyApiKey);
        }
        Ok(Self { base_url, api_key })
    }

    /// Reads `LMS_BACKEND_URL` and `LMS_BACKEND_ANON_KEY`; `None` when
    /// either is missing or unusable.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("LMS_BACKEND_URL").ok()?;
        let api_key = env::var("LMS_BACKEND_ANON_KEY").ok()?;
        Self::new(&base_url, api_key).ok()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Client for the hosted platform's REST, auth, and storage endpoints.
///
/// Each table lives under `/rest/v1`, identity under `/auth/v1`, and
/// objects under `/storage/v1`. The anon key rides along on every call;
/// once a session is open its access token takes over as the bearer.
#[derive(Clone)]
pub struct RemoteBackend {
    client: Client,
    config: RemoteConfig,
    access_token: Arc<Mutex<Option<String>>>,
}

impl RemoteBackend {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            access_token: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base())
    }

    pub(crate) fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base())
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base())
    }

    pub(crate) fn object_url(&self, bucket: &str, object_key: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{object_key}", self.base())
    }

    pub(crate) fn public_object_url(&self, bucket: &str, object_key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{object_key}",
            self.base()
        )
    }

    fn base(&self) -> &str {
        self.config.base_url.as_str().trim_end_matches('/')
    }

    /// Attaches the anon key and the current bearer to a request.
    pub(crate) fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
    }

    fn bearer(&self) -> String {
        let guard = self
            .access_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.clone().unwrap_or_else(|| self.config.api_key.clone())
    }

    pub(crate) fn session_token(&self) -> Option<String> {
        let guard = self
            .access_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.clone()
    }

    pub(crate) fn store_token(&self, token: Option<String>) {
        let mut guard = self
            .access_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = token;
    }
}

impl Backend {
    /// Build a `Backend` backed by the hosted platform.
    #[must_use]
    pub fn remote(config: RemoteConfig) -> Self {
        let remote = RemoteBackend::new(config);
        let progress: Arc<dyn ProgressStore> = Arc::new(remote.clone());
        let catalog: Arc<dyn CourseCatalog> = Arc::new(remote.clone());
        let profiles: Arc<dyn ProfileStore> = Arc::new(remote.clone());
        let avatars: Arc<dyn AvatarStore> = Arc::new(remote.clone());
        let identity: Arc<dyn IdentityProvider> = Arc::new(remote.clone());
        let access: Arc<dyn AccessControl> = Arc::new(remote);
        Self {
            progress,
            catalog,
            profiles,
            avatars,
            identity,
            access,
        }
    }
}

/// Maps a transport failure onto `BackendError::Connection`.
pub(crate) fn transport(error: reqwest::Error) -> BackendError {
    BackendError::Connection(error.to_string())
}

/// Maps a body-decoding failure onto `BackendError::Serialization`.
pub(crate) fn decode(error: reqwest::Error) -> BackendError {
    BackendError::Serialization(error.to_string())
}

/// Turns an unsuccessful response into a `BackendError`, preserving the
/// platform's own message wording for rejected requests.
pub(crate) async fn response_error(response: reqwest::Response) -> BackendError {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return BackendError::Unauthorized;
    }
    let body = response.text().await.unwrap_or_default();
    BackendError::Rejected {
        status: status.as_u16(),
        message: dto::error_message(&body, status),
    }
}
