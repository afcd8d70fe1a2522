/// PostgreSQL storage backend
///
/// Thin adapter from [`Store`] onto the model operations in
/// [`crate::models`]. sqlx errors are classified into [`StoreError`] on the
/// way out.
///
/// # Example
///
/// ```no_run
/// use chirpy_shared::db::pool::{create_pool, DatabaseConfig};
/// use chirpy_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
///
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::db::pool::health_check;
use crate::models::chirp::{Chirp, ChirpFilter, CreateChirp};
use crate::models::refresh_token::RefreshToken;
use crate::models::user::{CreateUser, UpdateCredentials, User};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        data: UpdateCredentials,
    ) -> StoreResult<Option<User>> {
        Ok(User::update_credentials(&self.pool, id, data).await?)
    }

    async fn upgrade_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::upgrade_to_red(&self.pool, id).await?)
    }

    async fn create_chirp(&self, data: CreateChirp) -> StoreResult<Chirp> {
        Ok(Chirp::create(&self.pool, data).await?)
    }

    async fn find_chirp(&self, id: Uuid) -> StoreResult<Option<Chirp>> {
        Ok(Chirp::find_by_id(&self.pool, id).await?)
    }

    async fn list_chirps(&self, filter: ChirpFilter) -> StoreResult<Vec<Chirp>> {
        Ok(Chirp::list(&self.pool, filter).await?)
    }

    async fn delete_chirp(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Chirp::delete(&self.pool, id).await?)
    }

    async fn insert_refresh_token(&self, token: RefreshToken) -> StoreResult<RefreshToken> {
        Ok(RefreshToken::create(&self.pool, &token).await?)
    }

    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::find_by_token(&self.pool, token).await?)
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::revoke(&self.pool, token, at).await?)
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let tokens = RefreshToken::delete_all(&mut *tx).await?;
        let chirps = Chirp::delete_all(&mut *tx).await?;
        let users = User::delete_all(&mut *tx).await?;

        tx.commit().await?;

        info!(users, chirps, refresh_tokens = tokens, "Database reset");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
