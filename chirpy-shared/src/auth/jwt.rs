/// Access token issuance and validation
///
/// Access tokens are compact JWTs signed with HS256 (HMAC-SHA256). They are
/// never persisted: validity is computed entirely from the signature and the
/// claims.
///
/// # Security
///
/// - **Algorithm**: HS256 only. A token whose header asserts any other
///   algorithm is rejected as a signature failure.
/// - **Ordering**: the signature is verified before any claim is trusted.
/// - **Expiration**: strict, `now >= exp` is expired. No leeway.
/// - **Issuer**: always `"chirpy"`.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::jwt::{issue_token, validate_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = issue_token(user_id, "your-secret-key", Duration::hours(1))?;
///
/// assert_eq!(validate_token(&token, "your-secret-key")?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Issuer claim carried by every access token
pub const ISSUER: &str = "chirpy";

/// Default access token lifetime in seconds
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token is not a well-formed JWT
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not verify, or the token uses another algorithm
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer { expected: String, actual: String },

    /// Token carries no subject
    #[error("Token has no subject")]
    MissingSubject,

    /// Subject is not an account identifier
    #[error("Invalid subject format: {0}")]
    InvalidSubjectFormat(String),
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (account ID as text)
/// - `iss`: Issuer (always "chirpy")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// `sub` is optional on the wire so that a token without a subject can be
/// reported as such instead of as a malformed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Account ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer - Always "chirpy"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued now
    pub fn new(subject: Uuid, ttl: Duration) -> Self {
        Self::issued_at(subject, ttl, Utc::now())
    }

    /// Creates claims issued at an explicit instant
    ///
    /// Two calls with the same arguments produce identical claims, and so
    /// identical tokens under the same secret.
    ///
    /// # Example
    ///
    /// ```
    /// use chirpy_shared::auth::jwt::Claims;
    /// use chrono::{Duration, Utc};
    /// use uuid::Uuid;
    ///
    /// let now = Utc::now();
    /// let claims = Claims::issued_at(Uuid::new_v4(), Duration::minutes(5), now);
    /// assert_eq!(claims.exp - claims.iat, 300);
    /// ```
    pub fn issued_at(subject: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            sub: Some(subject.to_string()),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues an access token for `subject`, valid for `ttl` from now
///
/// A zero or negative `ttl` yields a token that is already expired.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn issue_token(subject: Uuid, secret: &str, ttl: Duration) -> Result<String, JwtError> {
    create_token(&Claims::new(subject, ttl), secret)
}

/// Validates an access token and returns its subject
///
/// # Errors
///
/// In priority order:
/// - `Malformed` if the token is not a JWT
/// - `SignatureInvalid` if the HMAC does not verify or the algorithm is not HS256
/// - `Expired` if `now >= exp`
/// - `InvalidIssuer` if `iss` is not "chirpy"
/// - `MissingSubject` / `InvalidSubjectFormat` for a bad `sub`
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, JwtError> {
    validate_token_at(token, secret, Utc::now())
}

/// Validates an access token against an explicit clock
pub fn validate_token_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Uuid, JwtError> {
    let claims = decode_claims(token, secret)?;

    if claims.is_expired_at(now) {
        return Err(JwtError::Expired);
    }

    if claims.iss != ISSUER {
        return Err(JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
            actual: claims.iss,
        });
    }

    let subject = claims.sub.ok_or(JwtError::MissingSubject)?;
    Uuid::parse_str(&subject).map_err(|_| JwtError::InvalidSubjectFormat(subject))
}

/// Verifies the signature and decodes the claims without judging them
fn decode_claims(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    // Time and issuer checks happen afterwards so they can be reported in order
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::SignatureInvalid,
        _ => JwtError::Malformed(e.to_string()),
    })?;

    Ok(token_data.claims)
}
