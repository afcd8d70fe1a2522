/// Chirp model and database operations
///
/// Chirps are short posts of at most [`MAX_CHIRP_LENGTH`] characters owned by
/// a single account. A small set of words is masked before storage.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chirps (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     body TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::authorization::OwnedResource;

/// Maximum chirp length in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced by [`MASK`]
pub const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a profane word
pub const MASK: &str = "****";

/// Error type for chirp body validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChirpBodyError {
    /// Body exceeds the length limit
    #[error("Chirp is too long: {actual} characters, maximum is {max}")]
    TooLong { max: usize, actual: usize },
}

/// Chirp model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chirp {
    /// Unique chirp ID (UUID v4)
    pub id: Uuid,

    /// When the chirp was created
    pub created_at: DateTime<Utc>,

    /// When the chirp was last updated
    pub updated_at: DateTime<Utc>,

    /// Cleaned body text
    pub body: String,

    /// Owning account
    pub user_id: Uuid,
}

impl OwnedResource for Chirp {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Input for creating a chirp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChirp {
    /// Already cleaned body
    pub body: String,

    /// Owning account
    pub user_id: Uuid,
}

/// Listing order by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Asc,

    /// Newest first
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default)]
pub struct ChirpFilter {
    /// Only chirps by this account
    pub author_id: Option<Uuid>,

    /// Ordering by `created_at`
    pub order: SortOrder,
}

/// Masks profane words
///
/// Matching is case-insensitive on whole space-separated words, so
/// `"Sharbert!"` is left alone while `"SHARBERT"` is masked.
///
/// # Example
///
/// ```
/// use chirpy_shared::models::chirp::clean_body;
///
/// assert_eq!(clean_body("What a Kerfuffle it was"), "What a **** it was");
/// ```
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks the length limit and masks profane words
///
/// # Errors
///
/// Returns `ChirpBodyError::TooLong` if the body exceeds [`MAX_CHIRP_LENGTH`]
/// characters
pub fn prepare_body(body: &str) -> Result<String, ChirpBodyError> {
    let actual = body.chars().count();
    if actual > MAX_CHIRP_LENGTH {
        return Err(ChirpBodyError::TooLong {
            max: MAX_CHIRP_LENGTH,
            actual,
        });
    }

    Ok(clean_body(body))
}

impl Chirp {
    /// Builds a fresh, unpersisted chirp record
    pub fn new(data: CreateChirp, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: data.body,
            user_id: data.user_id,
        }
    }

    /// Creates a new chirp in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateChirp) -> Result<Self, sqlx::Error> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (body, user_id)
            VALUES ($1, $2)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(data.body)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(chirp)
    }

    /// Finds a chirp by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(chirp)
    }

    /// Lists chirps, optionally by a single author
    pub async fn list(pool: &PgPool, filter: ChirpFilter) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {order}, id {order}
            "#,
            order = filter.order.as_sql()
        );

        let chirps = sqlx::query_as::<_, Chirp>(&query)
            .bind(filter.author_id)
            .fetch_all(pool)
            .await?;

        Ok(chirps)
    }

    /// Deletes a chirp
    ///
    /// # Returns
    ///
    /// true if a chirp was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every chirp
    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
