//! Router composition and the serve loop.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::error::RelayError;
use crate::ws::handler::ws_handler;

/// Builds the complete application: message stream, REST endpoints and
/// (with the `swagger-ui` feature) the API explorer.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(api::swagger_ui());

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the relay on `listener` until the process is stopped.
///
/// # Errors
///
/// Returns [`RelayError::Io`] if the accept loop fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), RelayError> {
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}
