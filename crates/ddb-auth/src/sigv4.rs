//! AWS Signature Version 4 signing.
//!
//! 1. Stamp the request with `x-amz-date`, `host` and (for temporary
//!    credentials) `x-amz-security-token`.
//! 2. Build the canonical request over every header present.
//! 3. Build the string to sign from the timestamp, credential scope and the
//!    canonical request hash.
//! 4. Derive the signing key with the HMAC-SHA256 chain and sign.
//! 5. Attach the `Authorization` header.
//!
//! The main entry point is [`sign_request`].

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use http::HeaderValue;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::canonical::CanonicalRequest;
use crate::credentials::Credentials;
use crate::error::AuthError;

/// The only algorithm this crate signs with.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

type HmacSha256 = Hmac<Sha256>;

/// What a request is signed for, and when.
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    /// Credentials to sign with.
    pub credentials: &'a Credentials,
    /// Region of the credential scope, e.g. `us-east-1`.
    pub region: &'a str,
    /// Service of the credential scope, e.g. `dynamodb`.
    pub service: &'a str,
    /// Signing time.
    pub time: DateTime<Utc>,
}

/// Sign `request` in place.
///
/// Every header already on the request is signed, so add all headers before
/// calling this. Any existing `Authorization` header is replaced.
///
/// # Errors
///
/// Returns [`AuthError::MissingHost`] when neither a `Host` header nor a URI
/// authority is available, or [`AuthError::InvalidHeaderValue`] when a header
/// value is not printable ASCII.
pub fn sign_request(
    request: &mut http::Request<Vec<u8>>,
    params: &SigningParams<'_>,
) -> Result<(), AuthError> {
    let timestamp = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();

    let headers = request.headers_mut();
    headers.remove(http::header::AUTHORIZATION);
    headers.insert(X_AMZ_DATE, header_value(X_AMZ_DATE, &timestamp)?);
    if let Some(token) = &params.credentials.session_token {
        headers.insert(X_AMZ_SECURITY_TOKEN, header_value(X_AMZ_SECURITY_TOKEN, token)?);
    }

    if !request.headers().contains_key(http::header::HOST) {
        let authority = request
            .uri()
            .authority()
            .ok_or(AuthError::MissingHost)?
            .as_str()
            .to_owned();
        request
            .headers_mut()
            .insert(http::header::HOST, header_value("host", &authority)?);
    }

    let payload_hash = hash_payload(request.body());
    let header_pairs = request
        .headers()
        .iter()
        .map(|(name, value)| {
            value
                .to_str()
                .map(|v| (name.as_str(), v))
                .map_err(|_| AuthError::InvalidHeaderValue(name.as_str().to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let canonical = CanonicalRequest::new(
        request.method().as_str(),
        request.uri().path(),
        request.uri().query().unwrap_or(""),
        &header_pairs,
        &payload_hash,
    );
    debug!(canonical_request = %canonical.text, "Built canonical request");

    let scope = credential_scope(&date, params.region, params.service);
    let string_to_sign = build_string_to_sign(
        &timestamp,
        &scope,
        &hex::encode(Sha256::digest(canonical.text.as_bytes())),
    );

    let signing_key = derive_signing_key(
        &params.credentials.secret_access_key,
        &date,
        params.region,
        params.service,
    );
    let signature = compute_signature(&signing_key, &string_to_sign);

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
        params.credentials.access_key_id, canonical.signed_headers,
    );
    request.headers_mut().insert(
        http::header::AUTHORIZATION,
        header_value("authorization", &authorization)?,
    );

    debug!(
        access_key_id = %params.credentials.access_key_id,
        region = params.region,
        service = params.service,
        signed_headers = %canonical.signed_headers,
        "Signed request"
    );
    Ok(())
}

/// `<date>/<region>/<service>/aws4_request`
#[must_use]
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/aws4_request")
}

/// Build the SigV4 string to sign.
///
/// ```
/// use ddb_auth::sigv4::build_string_to_sign;
///
/// let sts = build_string_to_sign("20130524T000000Z", "20130524/us-east-1/s3/aws4_request", "abc");
/// assert_eq!(sts, "AWS4-HMAC-SHA256\n20130524T000000Z\n20130524/us-east-1/s3/aws4_request\nabc");
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the scoped signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a request body.
///
/// ```
/// use ddb_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))
}
