/// Payment provider webhook
///
/// # Endpoint
///
/// ```text
/// POST /api/polka/webhooks
/// Authorization: ApiKey <POLKA_KEY>
/// Content-Type: application/json
///
/// {
///   "event": "user.upgraded",
///   "data": { "user_id": "3311741c-680c-4546-99f3-fc9efac2036c" }
/// }
/// ```
///
/// The key is checked before the body is parsed.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chirpy_shared::{
    auth::credentials::{extract_credential, verify_service_key, Scheme},
    events::webhook::WebhookEvent,
};

/// Handles a provider event
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong `ApiKey`, or no key configured
/// - `400 Bad Request`: No `event` kind, or a known event with the wrong `data`
/// - `404 Not Found`: Upgrade names an unknown account
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let presented = extract_credential(&headers, Scheme::ApiKey)?;

    let expected = state
        .config
        .auth
        .polka_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Webhook key not configured".to_string()))?;

    if !verify_service_key(presented, expected) {
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    let event = WebhookEvent::from_json(&body)?;
    event.apply(state.store.as_ref()).await?;

    Ok(StatusCode::NO_CONTENT)
}
