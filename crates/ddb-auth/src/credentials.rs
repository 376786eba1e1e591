//! Credentials and the providers that supply them.

use std::fmt;

use crate::error::AuthError;

/// An access key pair, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl Credentials {
    /// Create credentials from their parts.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Source of the credentials used to sign requests.
pub trait CredentialProvider: Send + Sync {
    /// Resolve the credentials to sign with.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if no usable credentials are available.
    fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// Always hands out the same credentials.
///
/// # Examples
///
/// ```
/// use ddb_auth::credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(Credentials::new("AKID", "secret", None));
/// assert_eq!(provider.credentials().unwrap().access_key_id, "AKID");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Wrap a fixed set of credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self.credentials.clone())
    }
}
