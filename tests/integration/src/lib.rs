//! End-to-end tests for ddb.
//!
//! These tests require a DynamoDB-compatible endpoint (DynamoDB Local,
//! LocalStack, ...) at `localhost:8000`, or wherever `DDB_ENDPOINT_URL`
//! points. They are marked `#[ignore]` so they don't run during normal
//! `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p ddb-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use ddb_auth::{Credentials as SigningCredentials, StaticCredentialProvider};
use ddb_client::{ClientConfig, DynamoDBClient};

static INIT: Once = Once::new();

const REGION: &str = "us-east-1";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL of the server under test.
fn endpoint_url() -> String {
    std::env::var("DDB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}

/// SDK client used to create tables and seed items.
#[must_use]
pub fn sdk_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// The client under test, pointing at the same server.
#[must_use]
pub fn ddb_client() -> DynamoDBClient {
    init_tracing();

    let config = ClientConfig {
        endpoint_url: Some(endpoint_url()),
        region: REGION.to_owned(),
        ..Default::default()
    };
    let credentials = StaticCredentialProvider::new(SigningCredentials {
        access_key_id: "test".to_owned(),
        secret_access_key: "test".to_owned(),
        session_token: None,
    });
    DynamoDBClient::new(&config, Arc::new(credentials))
        .unwrap_or_else(|e| panic!("failed to create client: {e}"))
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_get;
