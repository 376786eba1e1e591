//! Canonical request construction for AWS Signature Version 4.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters gets encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A canonical request together with the header list it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// The newline-joined canonical request text.
    pub text: String,
    /// Semicolon-separated, sorted, lowercase names of the signed headers.
    pub signed_headers: String,
}

impl CanonicalRequest {
    /// Build the canonical request, signing every header in `headers`.
    ///
    /// Header names are lowercased and sorted; repeated names have their
    /// values joined with commas.
    ///
    /// # Examples
    ///
    /// ```
    /// use ddb_auth::canonical::CanonicalRequest;
    ///
    /// let req = CanonicalRequest::new(
    ///     "POST",
    ///     "/",
    ///     "",
    ///     &[("Host", "dynamodb.us-east-1.amazonaws.com"), ("X-Amz-Date", "20240101T000000Z")],
    ///     "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
    /// );
    /// assert_eq!(req.signed_headers, "host;x-amz-date");
    /// assert!(req.text.starts_with("POST\n/\n\n"));
    /// ```
    #[must_use]
    pub fn new(
        method: &str,
        path: &str,
        query: &str,
        headers: &[(&str, &str)],
        payload_hash: &str,
    ) -> Self {
        let header_map = canonical_header_map(headers);
        let canonical_headers = header_map
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join("\n");
        let signed_headers = header_map.keys().map(String::as_str).collect::<Vec<_>>().join(";");

        let text = format!(
            "{method}\n{}\n{}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}",
            canonical_uri(path),
            canonical_query_string(query),
        );

        Self {
            text,
            signed_headers,
        }
    }
}

/// Encode each path segment, keeping the slashes. An empty path becomes `/`.
///
/// ```
/// use ddb_auth::canonical::canonical_uri;
///
/// assert_eq!(canonical_uri(""), "/");
/// assert_eq!(canonical_uri("/a b"), "/a%20b");
/// ```
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, URI_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query parameters by name, then value. Values are kept as sent.
#[must_use]
pub fn canonical_query_string(query: &str) -> String {
    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();
    params.sort_unstable();
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_header_map(headers: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = collapse_whitespace(value.trim());
        map.entry(name.to_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
            }
            prev_was_space = true;
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;

    const EMPTY_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_should_match_published_get_object_canonical_request() {
        let req = CanonicalRequest::new(
            "GET",
            "/test.txt",
            "",
            &[
                ("x-amz-date", "20130524T000000Z"),
                ("Host", "examplebucket.s3.amazonaws.com"),
                ("x-amz-content-sha256", EMPTY_HASH),
                ("Range", "bytes=0-9"),
            ],
            EMPTY_HASH,
        );

        assert_eq!(req.signed_headers, "host;range;x-amz-content-sha256;x-amz-date");
        let hash = hex::encode(Sha256::digest(req.text.as_bytes()));
        assert_eq!(
            hash,
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );
    }

    #[test]
    fn test_should_join_repeated_headers_with_commas() {
        let req = CanonicalRequest::new(
            "POST",
            "/",
            "",
            &[("X-Tag", "a"), ("x-tag", "  b   c ")],
            EMPTY_HASH,
        );
        assert!(req.text.contains("x-tag:a,b c\n"));
        assert_eq!(req.signed_headers, "x-tag");
    }

    #[test]
    fn test_should_sort_query_parameters() {
        assert_eq!(canonical_query_string("b=2&a=1&a=0"), "a=0&a=1&b=2");
        assert_eq!(canonical_query_string(""), "");
    }

    #[test]
    fn test_should_keep_root_path() {
        assert_eq!(canonical_uri("/"), "/");
    }
}
