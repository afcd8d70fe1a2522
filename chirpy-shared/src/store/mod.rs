/// Storage contract
///
/// Every persistent operation the service performs goes through [`Store`].
/// Two implementations exist:
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx, used in production
/// - [`memory::MemoryStore`]: process-local maps, used in development and tests
///
/// Each operation is atomic on its own. `reset` removes everything in one step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::chirp::{Chirp, ChirpFilter, CreateChirp};
use crate::models::refresh_token::RefreshToken;
use crate::models::user::{CreateUser, UpdateCredentials, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sqlx::Error as SqlxError;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness or reference constraint was violated
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// The backend failed
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }

        StoreError::Database(err)
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage collaborator for accounts, chirps and refresh tokens
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates an account; fails `Conflict` if the email is taken
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds an account by ID
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Finds an account by email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Replaces email and password hash; None if the account does not exist
    async fn update_user_credentials(
        &self,
        id: Uuid,
        data: UpdateCredentials,
    ) -> StoreResult<Option<User>>;

    /// Sets the Chirpy Red flag; false if the account does not exist
    async fn upgrade_user(&self, id: Uuid) -> StoreResult<bool>;

    /// Creates a chirp; fails `Conflict` if the owner does not exist
    async fn create_chirp(&self, data: CreateChirp) -> StoreResult<Chirp>;

    /// Finds a chirp by ID
    async fn find_chirp(&self, id: Uuid) -> StoreResult<Option<Chirp>>;

    /// Lists chirps ordered by creation time
    async fn list_chirps(&self, filter: ChirpFilter) -> StoreResult<Vec<Chirp>>;

    /// Deletes a chirp; false if it did not exist
    async fn delete_chirp(&self, id: Uuid) -> StoreResult<bool>;

    /// Persists a refresh token record
    async fn insert_refresh_token(&self, token: RefreshToken) -> StoreResult<RefreshToken>;

    /// Finds a refresh token record by value
    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>>;

    /// Marks a refresh token revoked at `at` unless already revoked
    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>>;

    /// Deletes all refresh tokens, chirps and accounts
    async fn reset(&self) -> StoreResult<()>;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
