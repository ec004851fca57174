use std::sync::Arc;

use backend::IdentityProvider;
use lms_core::model::{AuthUser, Credentials};

use crate::error::AuthError;

/// Fronts the identity provider, validating credentials before they ever
/// leave the client.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// The signed-in account, or `None` when no session is open.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` if the session lookup fails.
    pub async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.identity.current_user().await?)
    }

    /// Opens a session for an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credentials` if the email or password is
    /// malformed, without contacting the backend; `AuthError::Backend`
    /// carries the platform's own rejection otherwise.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let credentials = Credentials::new(email, password)?;
        Ok(self.identity.sign_in(&credentials).await?)
    }

    /// Registers a new account and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credentials` if the email or password is
    /// malformed, without contacting the backend; `AuthError::Backend`
    /// carries the platform's own rejection otherwise.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let credentials = Credentials::new(email, password)?;
        Ok(self.identity.sign_up(&credentials).await?)
    }

    /// Ends the current session. Signing out without one is harmless.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` if the platform rejects the sign-out.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(self.identity.sign_out().await?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use backend::BackendError;
    use backend::memory::InMemoryBackend;
    use lms_core::model::CredentialsError;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryBackend::new()))
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_the_backend() {
        let result = service().sign_in("not-an-email", "pw").await;
        assert!(matches!(
            result,
            Err(AuthError::Credentials(CredentialsError::MalformedEmail))
        ));
    }

    #[tokio::test]
    async fn empty_password_is_rejected_locally() {
        let result = service().sign_up("ada@example.com", "").await;
        assert!(matches!(
            result,
            Err(AuthError::Credentials(CredentialsError::EmptyPassword))
        ));
    }

    #[tokio::test]
    async fn sign_up_opens_a_session() {
        let service = service();

        let user = service.sign_up("ada@example.com", "pw").await.unwrap();
        assert_eq!(user.email(), Some("ada@example.com"));

        let current = service.current_user().await.unwrap().unwrap();
        assert_eq!(current.id(), user.id());
    }

    #[tokio::test]
    async fn wrong_password_surfaces_the_platform_rejection() {
        let service = service();
        service.sign_up("ada@example.com", "pw").await.unwrap();

        let result = service.sign_in("ada@example.com", "other").await;
        match result {
            Err(AuthError::Backend(BackendError::Rejected { status, .. })) => {
                assert_eq!(status, 400);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_out_clears_the_session() {
        let service = service();
        service.sign_up("ada@example.com", "pw").await.unwrap();

        service.sign_out().await.unwrap();
        assert!(service.current_user().await.unwrap().is_none());

        // A second sign-out has no session to end and still succeeds.
        service.sign_out().await.unwrap();
    }
}
