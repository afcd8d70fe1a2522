/// Credential extraction from request headers
///
/// Both client credentials and service credentials travel in the
/// `Authorization` header as `<Scheme> <credential>`:
///
/// - `Authorization: Bearer <token>` for access and refresh tokens
/// - `Authorization: ApiKey <key>` for the payment provider webhook
///
/// Leading and trailing whitespace is ignored, the scheme is matched
/// case-sensitively and must be separated from the credential by whitespace.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::credentials::{parse_credential, Scheme};
///
/// assert_eq!(parse_credential(" Bearer  tok123  ", Scheme::Bearer).unwrap(), "tok123");
/// assert!(parse_credential("bearer tok123", Scheme::Bearer).is_err());
/// ```

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use std::fmt;

/// Credential scheme prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Access or refresh token
    Bearer,

    /// Service API key
    ApiKey,
}

impl Scheme {
    /// Gets the literal header prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for credential extraction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// No usable Authorization header
    #[error("Missing authorization header")]
    MissingHeader,

    /// Header does not start with the expected scheme
    #[error("Expected {expected} credentials")]
    SchemeMismatch { expected: Scheme },

    /// Scheme present but nothing follows it
    #[error("Empty {0} credential")]
    EmptyCredential(Scheme),
}

/// Parses `<scheme> <credential>` out of a raw header value
///
/// # Errors
///
/// - `MissingHeader` if the value is empty after trimming
/// - `SchemeMismatch` if the value does not start with `scheme` followed by
///   whitespace
/// - `EmptyCredential` if nothing follows the scheme
pub fn parse_credential(value: &str, scheme: Scheme) -> Result<&str, CredentialError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CredentialError::MissingHeader);
    }

    let mismatch = || CredentialError::SchemeMismatch { expected: scheme };
    let rest = value.strip_prefix(scheme.as_str()).ok_or_else(mismatch)?;

    // "Bearerabc" is not a Bearer credential
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Err(mismatch());
    }

    let credential = rest.trim();
    if credential.is_empty() {
        return Err(CredentialError::EmptyCredential(scheme));
    }

    Ok(credential)
}

/// Extracts a credential from the `Authorization` header
///
/// A header that is absent, empty or not valid ASCII counts as missing.
pub fn extract_credential(headers: &HeaderMap, scheme: Scheme) -> Result<&str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(CredentialError::MissingHeader)?;

    parse_credential(value, scheme)
}

/// Hashes a service key using SHA-256
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
pub fn hash_service_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time string comparison
///
/// Returns early only on a length difference.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks a presented service key against the configured one
///
/// Both keys are hashed first so the comparison always runs over 64 bytes
/// regardless of the presented length.
pub fn verify_service_key(presented: &str, expected: &str) -> bool {
    constant_time_compare(&hash_service_key(presented), &hash_service_key(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_credential(" Bearer  tok123  ", Scheme::Bearer), Ok("tok123"));
        assert_eq!(parse_credential("ApiKey\tf271c81ff7084ee5", Scheme::ApiKey), Ok("f271c81ff7084ee5"));
    }

    #[test]
    fn test_parse_scheme_mismatch() {
        for value in ["Berer tok", "bearer tok", "Basic dXNlcjpwdw==", "Bearertok", "tok"] {
            assert_eq!(
                parse_credential(value, Scheme::Bearer),
                Err(CredentialError::SchemeMismatch { expected: Scheme::Bearer }),
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn test_parse_wrong_scheme_kind() {
        assert_eq!(
            parse_credential("Bearer tok", Scheme::ApiKey),
            Err(CredentialError::SchemeMismatch { expected: Scheme::ApiKey })
        );
    }

    #[test]
    fn test_parse_empty_values() {
        assert_eq!(parse_credential("", Scheme::Bearer), Err(CredentialError::MissingHeader));
        assert_eq!(parse_credential("   ", Scheme::Bearer), Err(CredentialError::MissingHeader));
        assert_eq!(
            parse_credential("Bearer   ", Scheme::Bearer),
            Err(CredentialError::EmptyCredential(Scheme::Bearer))
        );
    }

    #[test]
    fn test_extract_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        assert_eq!(extract_credential(&headers, Scheme::Bearer), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extract_missing_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-authorization", HeaderValue::from_static("Bearer tok"));

        assert_eq!(
            extract_credential(&headers, Scheme::Bearer),
            Err(CredentialError::MissingHeader)
        );
        assert_eq!(
            extract_credential(&HeaderMap::new(), Scheme::Bearer),
            Err(CredentialError::MissingHeader)
        );
    }

    #[test]
    fn test_extract_non_ascii_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftok").unwrap(),
        );

        assert_eq!(
            extract_credential(&headers, Scheme::Bearer),
            Err(CredentialError::MissingHeader)
        );
    }

    #[test]
    fn test_hash_service_key() {
        let hash = hash_service_key("key");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_service_key("key"));
        assert_ne!(hash, hash_service_key("other"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello!"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_verify_service_key() {
        assert!(verify_service_key("f271c81ff7084ee5", "f271c81ff7084ee5"));
        assert!(!verify_service_key("f271c81ff7084ee6", "f271c81ff7084ee5"));
        assert!(!verify_service_key("", "f271c81ff7084ee5"));
    }
}
