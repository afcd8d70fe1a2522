/// Database models for Chirpy
///
/// This module contains the persisted records and their PostgreSQL
/// operations. The in-memory store works on the same types.
///
/// # Models
///
/// - `user`: Accounts, password hashes and the Chirpy Red flag
/// - `chirp`: Short posts owned by an account
/// - `refresh_token`: Opaque long-lived session credentials
///
/// # Example
///
/// ```no_run
/// use chirpy_shared::models::user::{User, CreateUser};
/// use chirpy_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "walt@breakingbad.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod chirp;
pub mod refresh_token;
pub mod user;
