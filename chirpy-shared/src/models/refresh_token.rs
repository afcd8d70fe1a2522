/// Refresh token model and database operations
///
/// A refresh token is an opaque random string that a client exchanges for new
/// access tokens. The token value itself is the primary key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_tokens (
///     token TEXT PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ
/// );
/// ```
///
/// # State
///
/// `revoked_at` is written at most once. Expiry is never stored; it is derived
/// from `expires_at` and the clock, see [`RefreshToken::state_at`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Lifecycle state of a refresh token at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenState {
    /// Usable
    Active,

    /// Past `expires_at`
    Expired,

    /// Explicitly revoked (terminal)
    Revoked,
}

/// Refresh token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    /// Hex-encoded token value
    pub token: String,

    /// Account the token was issued to
    pub user_id: Uuid,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// When the record last changed
    pub updated_at: DateTime<Utc>,

    /// End of validity
    pub expires_at: DateTime<Utc>,

    /// When the token was revoked (None if never)
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Gets the state at `now`
    ///
    /// Revocation takes precedence over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Inserts a token record
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate token value or an unknown user
    pub async fn create(pool: &PgPool, token: &RefreshToken) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Finds a token record by value
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Revokes a token
    ///
    /// An already revoked token keeps its original `revoked_at`.
    ///
    /// # Returns
    ///
    /// The record after revocation, or None if the token does not exist
    pub async fn revoke(
        pool: &PgPool,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token = $1
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(at)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Deletes every token record
    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens")
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_at(now: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            token: "ab".repeat(32),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[test]
    fn test_state_active_until_expiry() {
        let now = Utc::now();
        let token = token_at(now);

        assert_eq!(token.state_at(now), RefreshTokenState::Active);
        assert_eq!(
            token.state_at(now + Duration::days(59)),
            RefreshTokenState::Active
        );
        assert_eq!(
            token.state_at(now + Duration::days(60)),
            RefreshTokenState::Expired
        );
    }

    #[test]
    fn test_revoked_takes_precedence() {
        let now = Utc::now();
        let mut token = token_at(now);
        token.revoked_at = Some(now);

        assert_eq!(token.state_at(now), RefreshTokenState::Revoked);
        assert_eq!(
            token.state_at(now + Duration::days(90)),
            RefreshTokenState::Revoked
        );
    }
}
