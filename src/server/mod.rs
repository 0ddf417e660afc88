pub mod handlers;
pub mod logging;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tracing::info;

use crate::backend::Backend;
use crate::queue::QueueClient;

use self::handlers::AppState;

/// Build the axum router: one POST route per backend plus `/health`.
pub fn build_router(
    queue: QueueClient,
    backends: Vec<Arc<dyn Backend>>,
    body_limit: usize,
) -> Router {
    let mut router = Router::new().route("/health", get(handlers::health));

    for backend in &backends {
        info!(
            backend = backend.name(),
            route = backend.route(),
            host = backend.host(),
            fn_index = backend.fn_index(),
            "mounting backend"
        );
        router = router.route(
            backend.route(),
            post(handlers::job).layer(Extension(backend.clone())),
        );
    }

    let state = Arc::new(AppState { queue, backends });

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}
