use crate::routes;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Build the Axum application
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    // Any origin, method and header; credentialed requests echo the origin back.
    let cors = CorsLayer::very_permissive();

    Router::new()
        .route("/", get(routes::home))
        .route("/recommend", post(routes::recommend))
        .route("/metrics", get(routes::metrics))
        .fallback(routes::fallback)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn run_server<F>(router: Router, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
