//! Signed `awsJson1_0` client.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ddb_auth::{CredentialProvider, SigningParams, sign_request};
use ddb_core::codec::parse_wire_item;
use ddb_core::{FetchError, TableStore};
use ddb_model::input::{DescribeTableInput, GetItemInput};
use ddb_model::output::{DescribeTableOutput, GetItemOutput};
use ddb_model::{DynamoDBError, DynamoDBOperation};
use http::{Method, Uri, header};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Content type of every `awsJson1_0` request.
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Signing name of the service.
pub const SIGNING_SERVICE: &str = "dynamodb";

/// A DynamoDB client speaking JSON over HTTP.
#[derive(Clone)]
pub struct DynamoDBClient {
    http: reqwest::Client,
    endpoint: Uri,
    region: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for DynamoDBClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamoDBClient")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl DynamoDBClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEndpoint`] if the endpoint is not an
    /// absolute `http` or `https` URL, or [`ClientError::Build`] if the HTTP
    /// client cannot be created.
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ClientError> {
        let endpoint = parse_endpoint(&config.endpoint())?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;
        debug!(endpoint = %endpoint, region = %config.region, "Created DynamoDB client");
        Ok(Self {
            http,
            endpoint,
            region: config.region.clone(),
            credentials,
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Build the signed request for `operation` with a JSON `body`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if credentials are unavailable or the
    /// request cannot be signed.
    pub fn build_request(
        &self,
        operation: DynamoDBOperation,
        body: Vec<u8>,
        time: DateTime<Utc>,
    ) -> Result<http::Request<Vec<u8>>, ClientError> {
        let mut request = http::Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .header("x-amz-target", operation.target())
            .body(body)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;

        let credentials = self.credentials.credentials()?;
        sign_request(
            &mut request,
            &SigningParams {
                credentials: &credentials,
                region: &self.region,
                service: SIGNING_SERVICE,
                time,
            },
        )?;
        Ok(request)
    }

    /// Send `operation` and return the raw success body.
    async fn call(&self, operation: DynamoDBOperation, body: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let request = self.build_request(operation, body, Utc::now())?;
        let (parts, body) = request.into_parts();

        debug!(operation = %operation, "Sending request");
        let response = self
            .http
            .post(self.endpoint.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(operation = %operation, status = %status, bytes = bytes.len(), "Received response");

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(DynamoDBError::from_response(status, &bytes).into())
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Uri, ClientError> {
    let invalid = || ClientError::InvalidEndpoint(raw.to_owned());
    let uri: Uri = raw.parse().map_err(|_| invalid())?;
    match (uri.scheme_str(), uri.authority()) {
        (Some("http" | "https"), Some(_)) => {}
        _ => return Err(invalid()),
    }
    let path = uri.path().trim_end_matches('/');
    format!(
        "{}://{}{path}/",
        uri.scheme_str().unwrap_or("https"),
        uri.authority().map(http::uri::Authority::as_str).unwrap_or_default()
    )
    .parse()
    .map_err(|_| invalid())
}

fn encode_body<T: serde::Serialize>(input: &T) -> Result<Vec<u8>, FetchError> {
    serde_json::to_vec(input).map_err(FetchError::external)
}

/// Parse a `DescribeTable` success body.
///
/// # Errors
///
/// Returns [`ClientError::InvalidResponse`] for malformed JSON or a body that
/// does not have the operation's shape.
pub fn parse_describe_response(body: &[u8]) -> Result<DescribeTableOutput, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Parse a `GetItem` success body.
///
/// The item goes through the wire parser so malformed attribute values are
/// reported as codec failures naming the attribute.
///
/// # Errors
///
/// Returns [`FetchError::Codec`] for a malformed item and
/// [`FetchError::External`] for a body that is not JSON.
pub fn parse_get_item_response(body: &[u8]) -> Result<GetItemOutput, FetchError> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    let item = match raw.get("Item") {
        None | Some(Value::Null) => None,
        Some(item) => Some(parse_wire_item(item)?),
    };
    Ok(GetItemOutput { item })
}

#[async_trait::async_trait]
impl TableStore for DynamoDBClient {
    async fn describe_table(&self, input: DescribeTableInput) -> ddb_core::Result<DescribeTableOutput> {
        let body = encode_body(&input)?;
        let response = self.call(DynamoDBOperation::DescribeTable, body).await?;
        Ok(parse_describe_response(&response)?)
    }

    async fn get_item(&self, input: GetItemInput) -> ddb_core::Result<GetItemOutput> {
        let body = encode_body(&input)?;
        let response = self.call(DynamoDBOperation::GetItem, body).await?;
        parse_get_item_response(&response)
    }
}
