//! HTTP client for DynamoDB's `awsJson1_0` protocol.
//!
//! [`DynamoDBClient`] implements [`ddb_core::TableStore`] by POSTing signed
//! JSON requests to a DynamoDB endpoint (AWS or any compatible emulator).
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;

pub use client::DynamoDBClient;
pub use config::ClientConfig;
pub use credentials::{SdkCredentialProvider, load_sdk_config, sdk_region};
pub use error::ClientError;
