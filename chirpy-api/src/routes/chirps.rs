/// Chirp endpoints
///
/// - `POST /api/chirps` - Post a chirp (Bearer access token)
/// - `GET /api/chirps` - List chirps, `?author_id=<uuid>&sort=asc|desc`
/// - `GET /api/chirps/:chirp_id` - Get one chirp
/// - `DELETE /api/chirps/:chirp_id` - Delete own chirp (Bearer access token)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chirpy_shared::{
    auth::{authorization::authorize_chirp_mutation, middleware::AuthContext},
    models::chirp::{prepare_body, Chirp, ChirpFilter, CreateChirp, SortOrder},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chirp creation request
#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    /// Raw body text
    pub body: String,
}

/// Listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsQuery {
    /// Only chirps by this account
    pub author_id: Option<Uuid>,

    /// Ordering by creation time
    pub sort: Option<SortOrder>,
}

/// Public view of a chirp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChirpResponse {
    /// Chirp ID
    pub id: Uuid,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,

    /// Cleaned body
    pub body: String,

    /// Author
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

/// Posts a chirp as the authenticated account
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `422 Unprocessable Entity`: Body longer than 140 characters
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateChirpRequest>,
) -> ApiResult<(StatusCode, Json<ChirpResponse>)> {
    let body = prepare_body(&req.body)?;

    let chirp = state
        .store
        .create_chirp(CreateChirp {
            body,
            user_id: auth.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(chirp.into())))
}

/// Lists chirps
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> ApiResult<Json<Vec<ChirpResponse>>> {
    let chirps = state
        .store
        .list_chirps(ChirpFilter {
            author_id: query.author_id,
            order: query.sort.unwrap_or_default(),
        })
        .await?;

    Ok(Json(chirps.into_iter().map(Into::into).collect()))
}

/// Gets one chirp
///
/// # Errors
///
/// - `404 Not Found`: No such chirp
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<Uuid>,
) -> ApiResult<Json<ChirpResponse>> {
    let chirp = state
        .store
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

    Ok(Json(chirp.into()))
}

/// Deletes a chirp owned by the caller
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token (checked first)
/// - `400 Bad Request`: `chirp_id` is not a UUID
/// - `404 Not Found`: No such chirp
/// - `403 Forbidden`: Chirp belongs to another account
pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let chirp =
        authorize_chirp_mutation(state.store.as_ref(), &headers, state.jwt_secret(), &chirp_id)
            .await?;

    if !state.store.delete_chirp(chirp.id).await? {
        return Err(ApiError::NotFound("Chirp not found".to_string()));
    }

    tracing::info!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}
