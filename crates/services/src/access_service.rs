use std::sync::Arc;

use backend::AccessControl;
use lms_core::model::{Role, UserId};
use tracing::warn;

/// Answers role questions for the UI, degrading to "not an admin" when the
/// check itself fails.
#[derive(Clone)]
pub struct AccessService {
    access: Arc<dyn AccessControl>,
}

impl AccessService {
    #[must_use]
    pub fn new(access: Arc<dyn AccessControl>) -> Self {
        Self { access }
    }

    /// Whether the user holds the admin role.
    ///
    /// A failed check is logged and answered with `false`; admin-only
    /// surfaces stay hidden rather than flickering open on a flaky
    /// connection.
    pub async fn is_admin(&self, user_id: &UserId) -> bool {
        match self.access.has_role(user_id, Role::Admin).await {
            Ok(held) => held,
            Err(error) => {
                warn!(user = %user_id, %error, "role check failed, treating user as non-admin");
                false
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use backend::BackendError;
    use backend::memory::InMemoryBackend;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    struct FailingAccess;

    #[async_trait]
    impl AccessControl for FailingAccess {
        async fn has_role(&self, _user_id: &UserId, _role: Role) -> Result<bool, BackendError> {
            Err(BackendError::Connection("simulated connection loss".into()))
        }
    }

    #[tokio::test]
    async fn granted_role_is_visible() {
        let backend = InMemoryBackend::new();
        backend.grant_role(&user(), Role::Admin).unwrap();

        let service = AccessService::new(Arc::new(backend));
        assert!(service.is_admin(&user()).await);
    }

    #[tokio::test]
    async fn absent_role_answers_false() {
        let service = AccessService::new(Arc::new(InMemoryBackend::new()));
        assert!(!service.is_admin(&user()).await);
    }

    #[tokio::test]
    async fn failed_check_degrades_to_false() {
        let service = AccessService::new(Arc::new(FailingAccess));
        assert!(!service.is_admin(&user()).await);
    }
}
