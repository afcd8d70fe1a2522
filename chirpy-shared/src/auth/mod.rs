/// Authentication and authorization utilities
///
/// This module provides the session lifecycle for Chirpy:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Short-lived HS256 access tokens
/// - [`credentials`]: Scheme-prefixed credential extraction from headers
/// - [`refresh_token`]: Opaque long-lived refresh token lifecycle
/// - [`middleware`]: Bearer authentication for Axum handlers
/// - [`authorization`]: Ownership gate for mutations
///
/// # Example
///
/// ```no_run
/// use chirpy_shared::auth::password::{hash_password, verify_password};
/// use chirpy_shared::auth::jwt::{issue_token, validate_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// verify_password("user_password", &hash)?;
///
/// let user_id = Uuid::new_v4();
/// let token = issue_token(user_id, "secret-key", chrono::Duration::hours(1))?;
/// assert_eq!(validate_token(&token, "secret-key")?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh_token;
