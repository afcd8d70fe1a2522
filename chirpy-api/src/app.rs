/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use chirpy_api::{app::AppState, config::Config};
/// use chirpy_shared::store::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = chirpy_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::metrics::{HitCounterLayer, Metrics}};
use axum::{
    extract::{Request, State},
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chirpy_shared::auth::{middleware::authenticate, refresh_token::RefreshTokenStore};
use chirpy_shared::store::Store;
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Request counters
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            metrics: Arc::new(Metrics::default()),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }

    /// Refresh token operations over the configured store
    pub fn refresh_tokens(&self) -> RefreshTokenStore<'_> {
        RefreshTokenStore::new(self.store.as_ref())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /app/*                     # Static files (counted)
/// ├── /admin/
/// │   ├── GET  /metrics          # Hit count page
/// │   └── POST /reset            # Dev-only data reset
/// └── /api/
///     ├── GET  /healthz
///     ├── POST /users            # Register
///     ├── PUT  /users            # Change credentials (Bearer access)
///     ├── POST /login
///     ├── POST /refresh          # Bearer refresh
///     ├── POST /revoke           # Bearer refresh
///     ├── GET  /chirps
///     ├── POST /chirps           # Bearer access
///     ├── GET  /chirps/:chirp_id
///     ├── DELETE /chirps/:chirp_id  # Bearer access, owner only
///     └── POST /polka/webhooks   # ApiKey
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let require_auth = middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let admin_routes = Router::new()
        .route("/metrics", get(routes::admin::metrics))
        .route("/reset", post(routes::admin::reset));

    let api_routes = Router::new()
        .route("/healthz", get(routes::health::health_check))
        .route(
            "/users",
            post(routes::users::create_user)
                .put(routes::users::update_user.layer(require_auth.clone())),
        )
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/revoke", post(routes::auth::revoke))
        .route(
            "/chirps",
            get(routes::chirps::list_chirps)
                .post(routes::chirps::create_chirp.layer(require_auth)),
        )
        .route(
            "/chirps/:chirp_id",
            get(routes::chirps::get_chirp).delete(routes::chirps::delete_chirp),
        )
        .route("/polka/webhooks", post(routes::webhooks::polka_webhook));

    let fileserver = HitCounterLayer::new(state.metrics.clone())
        .layer(ServeDir::new(&state.config.api.fileserver_root));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .nest_service("/app", fileserver)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer access token, then injects `AuthContext` into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
