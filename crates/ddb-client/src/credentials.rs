//! Credentials and region from the AWS SDK's default provider chain.
//!
//! The chain covers environment variables, shared config and credentials
//! files (profiles, SSO, `credential_process`), web identity tokens and the
//! ECS and EC2 instance metadata endpoints.

use std::time::SystemTime;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use chrono::{DateTime, Utc};
use ddb_auth::{AuthError, CredentialProvider, Credentials};
use tracing::debug;

use crate::error::ClientError;

/// Load the SDK's default configuration (region and credential chain).
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

/// The region the default chain resolved, if any.
#[must_use]
pub fn sdk_region(sdk: &SdkConfig) -> Option<String> {
    sdk.region().map(ToString::to_string)
}

/// Credentials resolved once from the SDK's default chain.
///
/// A lookup signs one or two requests, so the credentials are fetched up
/// front and reused. Temporary credentials are refused once they expire.
#[derive(Debug, Clone)]
pub struct SdkCredentialProvider {
    credentials: Credentials,
    expiry: Option<SystemTime>,
}

impl SdkCredentialProvider {
    /// Resolve credentials through `sdk`'s provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoCredentialProvider`] if `sdk` has no chain and
    /// [`ClientError::Credentials`] if the chain finds nothing.
    pub async fn load(sdk: &SdkConfig) -> Result<Self, ClientError> {
        let provider = sdk
            .credentials_provider()
            .ok_or(ClientError::NoCredentialProvider)?;
        let resolved = provider
            .provide_credentials()
            .await
            .map_err(ClientError::Credentials)?;
        debug!(
            access_key_id = resolved.access_key_id(),
            temporary = resolved.session_token().is_some(),
            "Resolved credentials from the default chain"
        );
        Ok(Self::from_sdk(&resolved))
    }

    /// Copy credentials resolved by the SDK.
    #[must_use]
    pub fn from_sdk(credentials: &aws_credential_types::Credentials) -> Self {
        Self {
            credentials: Credentials::new(
                credentials.access_key_id(),
                credentials.secret_access_key(),
                credentials.session_token().map(str::to_owned),
            ),
            expiry: credentials.expiry(),
        }
    }
}

impl CredentialProvider for SdkCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        match self.expiry {
            Some(expiry) if expiry <= SystemTime::now() => {
                Err(AuthError::ExpiredCredentials(DateTime::<Utc>::from(expiry)))
            }
            _ => Ok(self.credentials.clone()),
        }
    }
}
