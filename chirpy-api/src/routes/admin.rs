/// Admin endpoints
///
/// - `GET /admin/metrics` - HTML page with the file server hit count
/// - `POST /admin/reset` - Delete all data and zero the counter (dev only)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, response::Html};

/// Renders the hit count page
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        state.metrics.hits()
    ))
}

/// Deletes every account, chirp and refresh token and zeroes the counter
///
/// # Errors
///
/// - `403 Forbidden`: Not running with `PLATFORM=dev`
/// - `500 Internal Server Error`: Storage failure
pub async fn reset(State(state): State<AppState>) -> ApiResult<(StatusCode, &'static str)> {
    state
        .refresh_tokens()
        .reset_all(state.config.api.platform)
        .await?;
    state.metrics.reset();

    Ok((StatusCode::OK, "Reset successful"))
}
