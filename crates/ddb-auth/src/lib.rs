//! AWS Signature Version 4 request signing for ddb.
//!
//! Requests to DynamoDB must carry an `Authorization` header computed from the
//! request itself and the caller's secret key. This crate builds the canonical
//! request, derives the scoped signing key and stamps the outgoing
//! [`http::Request`] with the resulting headers.
//!
//! # Usage
//!
//! ```rust
//! use chrono::Utc;
//! use ddb_auth::credentials::Credentials;
//! use ddb_auth::sigv4::{SigningParams, sign_request};
//!
//! let credentials = Credentials::new("AKIDEXAMPLE", "secret", None);
//! let mut request = http::Request::builder()
//!     .method("POST")
//!     .uri("http://localhost:8000/")
//!     .header("content-type", "application/x-amz-json-1.0")
//!     .body(b"{}".to_vec())
//!     .unwrap();
//!
//! let params = SigningParams {
//!     credentials: &credentials,
//!     region: "us-east-1",
//!     service: "dynamodb",
//!     time: Utc::now(),
//! };
//! sign_request(&mut request, &params).unwrap();
//! assert!(request.headers().contains_key(http::header::AUTHORIZATION));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`credentials`] - Credentials and where they come from
//! - [`error`] - Signing error types
//! - [`sigv4`] - Key derivation and the request signer

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod sigv4;

pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use sigv4::{SigningParams, hash_payload, sign_request};
