use crate::router::{QueryRequest, QueryRoute, QueryRouter, StrategyBody};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use querent_core::QueryResult;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state.
pub struct AppState {
    /// Query routing and the strategy selector.
    pub router: Arc<QueryRouter>,
    /// Directory holding `index.html` and `/static` assets.
    pub static_dir: PathBuf,
}

/// The HTTP gateway.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the axum router with every route and the trace layer.
    pub fn build(router: Arc<QueryRouter>, static_dir: impl Into<PathBuf>) -> Router {
        let static_dir = static_dir.into();
        let state = Arc::new(AppState {
            router,
            static_dir: static_dir.clone(),
        });

        Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler))
            .route("/api/query", post(query_handler))
            .route("/api/query/invoke", post(invoke_handler))
            .route("/api/query/stream", post(stream_handler))
            .route("/api/strategy", get(get_strategy).put(put_strategy))
            .nest_service("/static", ServeDir::new(static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "querent"}))
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    let index_path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!(path = %index_path.display(), error = %e, "Index page unavailable");
            (
                StatusCode::NOT_FOUND,
                format!("index.html not found at {}", index_path.display()),
            )
                .into_response()
        }
    }
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResult> {
    Json(state.router.handle(QueryRoute::Default, request).await)
}

async fn invoke_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResult> {
    Json(state.router.handle(QueryRoute::Invoke, request).await)
}

async fn stream_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResult> {
    Json(state.router.handle(QueryRoute::Stream, request).await)
}

async fn get_strategy(State(state): State<Arc<AppState>>) -> Json<StrategyBody> {
    Json(StrategyBody {
        strategy: state.router.selector().current(),
    })
}

async fn put_strategy(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StrategyBody>,
) -> Json<StrategyBody> {
    state.router.selector().set(body.strategy);
    Json(body)
}
