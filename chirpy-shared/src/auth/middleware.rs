/// Bearer authentication
///
/// Validates the access token from `Authorization: Bearer <token>` and yields
/// the [`AuthContext`] a handler or middleware layer puts in the request
/// extensions.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use chirpy_shared::auth::middleware::authenticate;
///
/// # fn example(headers: &HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = authenticate(headers, "your-jwt-secret")?;
/// println!("Hello, user {}!", auth.user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::credentials::{extract_credential, CredentialError, Scheme};
use super::jwt::{validate_token, JwtError};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated account ID (the token subject)
    pub user_id: Uuid,
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Header missing or not a Bearer credential
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// Access token rejected
    #[error(transparent)]
    Token(#[from] JwtError),
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// Returns `AuthError::Credentials` if there is no Bearer credential and
/// `AuthError::Token` if the access token does not validate
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_credential(headers, Scheme::Bearer)?;
    let user_id = validate_token(token, secret).map_err(|e| {
        debug!(error = %e, "Rejected access token");
        e
    })?;
    Ok(AuthContext { user_id })
}
