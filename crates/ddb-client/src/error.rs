//! Client error types.

use aws_credential_types::provider::error::CredentialsError;
use ddb_auth::AuthError;
use ddb_core::FetchError;
use ddb_model::DynamoDBError;

/// Errors raised while talking to DynamoDB.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The endpoint URL is not an absolute `http(s)` URL.
    #[error("invalid endpoint URL '{0}'")]
    InvalidEndpoint(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// No credential provider chain is configured.
    #[error("no AWS credential provider is configured")]
    NoCredentialProvider,

    /// The credential provider chain found no usable credentials.
    #[error("failed to load AWS credentials: {0}")]
    Credentials(#[source] CredentialsError),

    /// The request could not be signed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The endpoint could not be reached.
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// Any other transport failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// DynamoDB answered with an error.
    #[error(transparent)]
    Service(#[from] DynamoDBError),

    /// The response body is not what the operation returns.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Network(e)
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(e: ClientError) -> Self {
        FetchError::external(e)
    }
}
