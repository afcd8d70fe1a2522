/// In-memory storage backend
///
/// Holds all records in `HashMap`s behind a single `tokio::sync::RwLock`, so
/// every operation sees a consistent snapshot. Data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::chirp::{Chirp, ChirpFilter, CreateChirp, SortOrder};
use crate::models::refresh_token::RefreshToken;
use crate::models::user::{CreateUser, UpdateCredentials, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    chirps: HashMap<Uuid, Chirp>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&data.email, None) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                data.email
            )));
        }

        let user = User::new(data, Utc::now());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        data: UpdateCredentials,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&data.email, Some(id)) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                data.email
            )));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.email = data.email;
            user.hashed_password = data.hashed_password;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_chirp(&self, data: CreateChirp) -> StoreResult<Chirp> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&data.user_id) {
            return Err(StoreError::Conflict(format!("unknown user {}", data.user_id)));
        }

        let chirp = Chirp::new(data, Utc::now());
        tables.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn find_chirp(&self, id: Uuid) -> StoreResult<Option<Chirp>> {
        Ok(self.tables.read().await.chirps.get(&id).cloned())
    }

    async fn list_chirps(&self, filter: ChirpFilter) -> StoreResult<Vec<Chirp>> {
        let tables = self.tables.read().await;
        let mut chirps: Vec<Chirp> = tables
            .chirps
            .values()
            .filter(|c| filter.author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();

        chirps.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        if filter.order == SortOrder::Desc {
            chirps.reverse();
        }

        Ok(chirps)
    }

    async fn delete_chirp(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.chirps.remove(&id).is_some())
    }

    async fn insert_refresh_token(&self, token: RefreshToken) -> StoreResult<RefreshToken> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&token.user_id) {
            return Err(StoreError::Conflict(format!("unknown user {}", token.user_id)));
        }
        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(StoreError::Conflict("duplicate refresh token".to_string()));
        }

        tables
            .refresh_tokens
            .insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self.tables.read().await.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut tables = self.tables.write().await;
        Ok(tables.refresh_tokens.get_mut(token).map(|record| {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
            record.clone()
        }))
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        debug!(
            users = tables.users.len(),
            chirps = tables.chirps.len(),
            refresh_tokens = tables.refresh_tokens.len(),
            "Resetting in-memory store"
        );
        *tables = Tables::default();
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
