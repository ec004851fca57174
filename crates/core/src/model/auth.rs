use std::fmt;

use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialsError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("email must contain an '@'")]
    MalformedEmail,

    #[error("password cannot be empty")]
    EmptyPassword,
}

//
// ─── CREDENTIALS ───────────────────────────────────────────────────────────────
//

/// Sign-in input, checked for shape only.
///
/// Whether the credentials are actually valid is decided by the identity
/// platform.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from raw input, trimming the email.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialsError` if the email is blank or lacks an `@`,
    /// or if the password is empty.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let email = email.into().trim().to_owned();
        if email.is_empty() {
            return Err(CredentialsError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(CredentialsError::MalformedEmail);
        }

        let password = password.into();
        if password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }

        Ok(Self { email, password })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keeps passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

//
// ─── AUTH USER ─────────────────────────────────────────────────────────────────
//

/// The signed-in account as reported by the identity platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    id: UserId,
    email: Option<String>,
}

impl AuthUser {
    #[must_use]
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self {
            id,
            email: email.filter(|e| !e.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
