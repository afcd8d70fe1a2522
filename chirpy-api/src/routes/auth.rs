/// Session endpoints
///
/// - `POST /api/login` - Verify password, issue access and refresh tokens
/// - `POST /api/refresh` - Exchange a refresh token for a new access token
/// - `POST /api/revoke` - Revoke a refresh token
///
/// Refresh and revoke read the refresh token from `Authorization: Bearer`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserResponse,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chirpy_shared::auth::{
    credentials::{extract_credential, Scheme},
    jwt, password,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response: the account plus both tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Account fields
    #[serde(flatten)]
    pub user: UserResponse,

    /// Access token
    pub token: String,

    /// Refresh token (64 hex characters)
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub token: String,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/login
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
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    password::verify_password(&req.password, &user.hashed_password)?;

    let token = jwt::issue_token(user.id, state.jwt_secret(), state.config.auth.access_token_ttl())?;
    let refresh = state.refresh_tokens().create(user.id).await?;

    tracing::debug!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: user.into(),
        token,
        refresh_token: refresh.token,
    }))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, unknown, expired or revoked refresh token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<RefreshResponse>> {
    let refresh_token = extract_credential(&headers, Scheme::Bearer)?;
    let user_id = state.refresh_tokens().lookup(refresh_token).await?;

    let token = jwt::issue_token(user_id, state.jwt_secret(), state.config.auth.access_token_ttl())?;

    Ok(Json(RefreshResponse { token }))
}

/// Refresh token revocation endpoint
///
/// Revoking an already revoked token succeeds.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or unknown refresh token
pub async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let refresh_token = extract_credential(&headers, Scheme::Bearer)?;
    state.refresh_tokens().revoke(refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
