/// Account endpoints
///
/// - `POST /api/users` - Register a new account
/// - `PUT /api/users` - Replace email and password (Bearer access token)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chirpy_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, UpdateCredentials, User},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Credential change request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// New plaintext password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,

    /// Email address
    pub email: String,

    /// Chirpy Red subscription flag
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Registers a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// {
///   "email": "walt@breakingbad.com",
///   "password": "04234"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let hashed_password =
        password::hash_password_with(&req.password, &state.config.auth.password_hashing)?;

    let user = state
        .store
        .create_user(CreateUser {
            email: req.email,
            hashed_password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Replaces the caller's email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Account no longer exists
/// - `409 Conflict`: Email taken by another account
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let hashed_password =
        password::hash_password_with(&req.password, &state.config.auth.password_hashing)?;

    let user = state
        .store
        .update_user_credentials(
            auth.user_id,
            UpdateCredentials {
                email: req.email,
                hashed_password,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
