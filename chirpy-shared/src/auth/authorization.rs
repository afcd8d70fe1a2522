/// Ownership checks for mutations
///
/// A mutation of an owned resource is allowed only when the authenticated
/// account is the resource owner. The gate runs three steps in a fixed order:
///
/// 1. **Authentication**: the request carries a valid access token
/// 2. **Existence**: the resource exists
/// 3. **Ownership**: the token subject is the owner
///
/// Authentication comes first so that unauthenticated callers cannot learn
/// which resources exist. The raw path id is only parsed once the caller is
/// authenticated.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use chirpy_shared::auth::authorization::authorize_chirp_mutation;
/// use chirpy_shared::store::Store;
///
/// # async fn example(store: &dyn Store, headers: &HeaderMap, chirp_id: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let chirp = authorize_chirp_mutation(store, headers, "secret", chirp_id).await?;
/// store.delete_chirp(chirp.id).await?;
/// # Ok(())
/// # }
/// ```

use axum::http::HeaderMap;
use tracing::debug;
use uuid::Uuid;

use super::middleware::{authenticate, AuthContext, AuthError};
use crate::models::chirp::Chirp;
use crate::store::{Store, StoreError};

/// A resource with a single owning account
pub trait OwnedResource {
    /// Gets the owning account ID
    fn owner_id(&self) -> Uuid;
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No valid access token
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    /// Resource id is not a UUID
    #[error("Invalid resource id: {0}")]
    InvalidId(String),

    /// Resource does not exist
    #[error("Resource not found")]
    NotFound,

    /// Authenticated account does not own the resource
    #[error("Not authorized to modify this resource")]
    Forbidden,

    /// Storage failure while resolving the resource
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Checks the authenticated account owns `resource`
///
/// # Errors
///
/// Returns `AuthzError::Forbidden` on a mismatch
pub fn require_ownership<R: OwnedResource>(
    auth: &AuthContext,
    resource: &R,
) -> Result<(), AuthzError> {
    if resource.owner_id() != auth.user_id {
        debug!(
            user_id = %auth.user_id,
            owner_id = %resource.owner_id(),
            "Ownership check failed"
        );
        return Err(AuthzError::Forbidden);
    }

    Ok(())
}

/// Authorizes a mutation of an optional resource for an authenticated caller
///
/// # Errors
///
/// `NotFound` if `resource` is None, `Forbidden` if it belongs to someone else
pub fn authorize_mutation<R: OwnedResource>(
    auth: &AuthContext,
    resource: Option<R>,
) -> Result<R, AuthzError> {
    let resource = resource.ok_or(AuthzError::NotFound)?;
    require_ownership(auth, &resource)?;
    Ok(resource)
}

/// Runs the full gate for a chirp mutation
///
/// # Returns
///
/// The chirp, once the caller is proven to own it
///
/// # Errors
///
/// `Unauthenticated`, then `InvalidId`, then `NotFound`, then `Forbidden`, in
/// that order. Store failures surface as `Storage`.
pub async fn authorize_chirp_mutation(
    store: &dyn Store,
    headers: &HeaderMap,
    secret: &str,
    chirp_id: &str,
) -> Result<Chirp, AuthzError> {
    let auth = authenticate(headers, secret)?;
    let chirp_id =
        Uuid::parse_str(chirp_id).map_err(|_| AuthzError::InvalidId(chirp_id.to_string()))?;
    let chirp = store.find_chirp(chirp_id).await?;
    authorize_mutation(&auth, chirp)
}
