//! DynamoDB service errors.
//!
//! DynamoDB reports failures as JSON with a `__type` field holding the
//! fully-qualified error type (`com.amazonaws.dynamodb.v20120810#Code`) and a
//! `message` (sometimes `Message`) field.

use std::fmt;

use serde::Deserialize;

/// Well-known DynamoDB error codes a read can come back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum DynamoDBErrorCode {
    /// Table not found.
    ResourceNotFoundException,
    /// Provisioned throughput exceeded.
    ProvisionedThroughputExceededException,
    /// Request limit exceeded.
    RequestLimitExceeded,
    /// Validation error.
    ValidationException,
    /// Serialization error.
    SerializationException,
    /// Internal server error.
    InternalServerError,
    /// Access denied.
    AccessDeniedException,
    /// Unknown access key or operation.
    UnrecognizedClientException,
    /// Signature did not match.
    InvalidSignatureException,
    /// Temporary credentials have expired.
    ExpiredTokenException,
    /// Throttled.
    ThrottlingException,
    /// Any code not listed above.
    #[default]
    Unknown,
}

impl DynamoDBErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ProvisionedThroughputExceededException => {
                "ProvisionedThroughputExceededException"
            }
            Self::RequestLimitExceeded => "RequestLimitExceeded",
            Self::ValidationException => "ValidationException",
            Self::SerializationException => "SerializationException",
            Self::InternalServerError => "InternalServerError",
            Self::AccessDeniedException => "AccessDeniedException",
            Self::UnrecognizedClientException => "UnrecognizedClientException",
            Self::InvalidSignatureException => "InvalidSignatureException",
            Self::ExpiredTokenException => "ExpiredTokenException",
            Self::ThrottlingException => "ThrottlingException",
            Self::Unknown => "Unknown",
        }
    }

    /// Maps a `__type` value (qualified or bare) to a code.
    #[must_use]
    pub fn from_error_type(error_type: &str) -> Self {
        let short = error_type.rsplit('#').next().unwrap_or(error_type);
        match short {
            "ResourceNotFoundException" => Self::ResourceNotFoundException,
            "ProvisionedThroughputExceededException" => {
                Self::ProvisionedThroughputExceededException
            }
            "RequestLimitExceeded" => Self::RequestLimitExceeded,
            "ValidationException" => Self::ValidationException,
            "SerializationException" => Self::SerializationException,
            "InternalServerError" => Self::InternalServerError,
            "AccessDeniedException" => Self::AccessDeniedException,
            "UnrecognizedClientException" => Self::UnrecognizedClientException,
            "InvalidSignatureException" => Self::InvalidSignatureException,
            "ExpiredTokenException" => Self::ExpiredTokenException,
            "ThrottlingException" => Self::ThrottlingException,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DynamoDBErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// A DynamoDB error response.
#[derive(Debug)]
pub struct DynamoDBError {
    /// The error code.
    pub code: DynamoDBErrorCode,
    /// The `__type` as sent by the service, kept for codes not in the enum.
    pub error_type: String,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
}

impl fmt::Display for DynamoDBError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.error_type.rsplit('#').next().unwrap_or(&self.error_type);
        write!(f, "{short} ({}): {}", self.status_code.as_u16(), self.message)
    }
}

impl std::error::Error for DynamoDBError {}

impl DynamoDBError {
    /// Create an error with a known code and message.
    #[must_use]
    pub fn with_message(
        code: DynamoDBErrorCode,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            error_type: code.as_str().to_owned(),
            message: message.into(),
            status_code,
        }
    }

    /// Parse an error response body.
    ///
    /// A body that is not the expected JSON still yields an error carrying
    /// the raw text as its message.
    #[must_use]
    pub fn from_response(status_code: http::StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => {
                let error_type = parsed.error_type.unwrap_or_default();
                Self {
                    code: DynamoDBErrorCode::from_error_type(&error_type),
                    error_type: if error_type.is_empty() {
                        DynamoDBErrorCode::Unknown.as_str().to_owned()
                    } else {
                        error_type
                    },
                    message: parsed.message.unwrap_or_default(),
                    status_code,
                }
            }
            Err(_) => Self::with_message(
                DynamoDBErrorCode::Unknown,
                status_code,
                String::from_utf8_lossy(body).into_owned(),
            ),
        }
    }

    /// Returns `true` if the table (or other resource) does not exist.
    #[must_use]
    pub fn is_resource_not_found(&self) -> bool {
        self.code == DynamoDBErrorCode::ResourceNotFoundException
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_qualified_error_type() {
        let body = br#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#;
        let err = DynamoDBError::from_response(http::StatusCode::BAD_REQUEST, body);
        assert!(err.is_resource_not_found());
        assert_eq!(err.message, "Requested resource not found");
        assert_eq!(
            err.to_string(),
            "ResourceNotFoundException (400): Requested resource not found"
        );
    }

    #[test]
    fn test_should_accept_capitalized_message() {
        let body = br#"{"__type":"com.amazon.coral.validate#ValidationException","Message":"bad key"}"#;
        let err = DynamoDBError::from_response(http::StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
        assert_eq!(err.message, "bad key");
    }

    #[test]
    fn test_should_keep_unlisted_error_type() {
        let body = br#"{"__type":"com.amazonaws.dynamodb.v20120810#TableNotReady","message":"x"}"#;
        let err = DynamoDBError::from_response(http::StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code, DynamoDBErrorCode::Unknown);
        assert!(err.to_string().starts_with("TableNotReady"));
    }

    #[test]
    fn test_should_fall_back_to_raw_body() {
        let err = DynamoDBError::from_response(http::StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.code, DynamoDBErrorCode::Unknown);
        assert_eq!(err.message, "upstream down");
    }
}
