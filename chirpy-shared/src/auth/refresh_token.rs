/// Refresh token lifecycle
///
/// Refresh tokens are 32 random bytes from the OS CSPRNG, hex-encoded to 64
/// lowercase characters. They are persisted through the [`Store`] and live
/// for [`REFRESH_TOKEN_TTL_DAYS`] days unless revoked first.
///
/// # States
///
/// ```text
/// Active --revoke--> Revoked   (terminal)
/// Active --clock---> Expired   (derived, never stored)
/// ```
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::refresh_token::RefreshTokenStore;
/// use chirpy_shared::models::user::CreateUser;
/// use chirpy_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.create_user(CreateUser {
///     email: "walt@breakingbad.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
///
/// let tokens = RefreshTokenStore::new(&store);
/// let record = tokens.create(user.id).await?;
/// assert_eq!(tokens.lookup(&record.token).await?, user.id);
///
/// tokens.revoke(&record.token).await?;
/// assert!(tokens.lookup(&record.token).await.is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::refresh_token::{RefreshToken, RefreshTokenState};
use crate::platform::Platform;
use crate::store::{Store, StoreError};

/// Refresh token lifetime in days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Random bytes per token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Error type for refresh token operations
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    /// No such token
    #[error("Refresh token not found")]
    NotFound,

    /// Token is past its expiry
    #[error("Refresh token has expired")]
    Expired,

    /// Token was revoked
    #[error("Refresh token has been revoked")]
    Revoked,

    /// Reset attempted outside development mode
    #[error("Reset is only allowed in dev mode")]
    Forbidden,

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Generates a new opaque token value
///
/// # Returns
///
/// 64 lowercase hex characters
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Refresh token operations over a [`Store`]
#[derive(Clone, Copy)]
pub struct RefreshTokenStore<'a> {
    store: &'a dyn Store,
}

impl<'a> RefreshTokenStore<'a> {
    /// Wraps a store
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Issues and persists a token for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the record cannot be written
    pub async fn create(&self, user_id: Uuid) -> Result<RefreshToken, RefreshTokenError> {
        self.create_at(user_id, Utc::now()).await
    }

    /// Issues a token as if the clock read `now`
    pub async fn create_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RefreshToken, RefreshTokenError> {
        let record = RefreshToken {
            token: generate_refresh_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            revoked_at: None,
        };

        Ok(self.store.insert_refresh_token(record).await?)
    }

    /// Resolves a token to its account
    ///
    /// # Errors
    ///
    /// `NotFound`, `Revoked` or `Expired`. Revocation is reported even when
    /// the token has also expired.
    pub async fn lookup(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        self.lookup_at(token, Utc::now()).await
    }

    /// Resolves a token against an explicit clock
    pub async fn lookup_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, RefreshTokenError> {
        let record = self
            .store
            .find_refresh_token(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        match record.state_at(now) {
            RefreshTokenState::Active => Ok(record.user_id),
            RefreshTokenState::Revoked => Err(RefreshTokenError::Revoked),
            RefreshTokenState::Expired => Err(RefreshTokenError::Expired),
        }
    }

    /// Revokes a token
    ///
    /// Revoking an already revoked token succeeds and keeps the first
    /// revocation time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the token does not exist
    pub async fn revoke(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        self.store
            .revoke_refresh_token(token, Utc::now())
            .await?
            .ok_or(RefreshTokenError::NotFound)
    }

    /// Deletes every refresh token, chirp and account
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` without touching any data unless `platform` is dev
    pub async fn reset_all(&self, platform: Platform) -> Result<(), RefreshTokenError> {
        if !platform.is_dev() {
            warn!(%platform, "Refused reset outside dev mode");
            return Err(RefreshTokenError::Forbidden);
        }

        self.store.reset().await?;
        info!("All accounts, chirps and refresh tokens deleted");
        Ok(())
    }
}
