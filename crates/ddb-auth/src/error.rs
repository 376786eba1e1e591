//! Error types for SigV4 signing.

use chrono::{DateTime, Utc};

/// Errors that can occur while signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The temporary credentials have passed their expiry time.
    #[error("Credentials expired at {0}")]
    ExpiredCredentials(DateTime<Utc>),

    /// The request has no `Host` header and its URI has no authority.
    #[error("Request has no host to sign")]
    MissingHost,

    /// A header value is not visible ASCII and cannot be canonicalized.
    #[error("Invalid value for header: {0}")]
    InvalidHeaderValue(String),
}
