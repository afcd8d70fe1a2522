/// File server hit counter
///
/// Wraps the static file service and counts every request that reaches it.
/// The count is exposed by `GET /admin/metrics` and cleared by the dev-mode
/// reset.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use chirpy_api::middleware::metrics::{HitCounterLayer, Metrics};
/// use std::sync::Arc;
/// use tower::Layer;
/// use tower_http::services::ServeDir;
///
/// let metrics = Arc::new(Metrics::default());
/// let app: Router = Router::new()
///     .nest_service("/app", HitCounterLayer::new(metrics).layer(ServeDir::new(".")));
/// ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Request counters shared through the application state
#[derive(Debug, Default)]
pub struct Metrics {
    file_server_hits: AtomicU64,
}

impl Metrics {
    /// Records one file server hit
    pub fn record_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the number of file server hits
    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    /// Sets the counter back to zero
    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// Hit counter middleware layer
#[derive(Clone)]
pub struct HitCounterLayer {
    metrics: Arc<Metrics>,
}

impl HitCounterLayer {
    /// Creates a layer counting into `metrics`
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for HitCounterLayer {
    type Service = HitCounter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HitCounter {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

/// Hit counter middleware service
#[derive(Clone)]
pub struct HitCounter<S> {
    inner: S,
    metrics: Arc<Metrics>,
}

impl<S, Req> Service<Req> for HitCounter<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Req) -> Self::Future {
        self.metrics.record_hit();
        self.inner.call(request)
    }
}
