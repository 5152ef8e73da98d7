//! HTTP front door for the proxy.
//!
//! A single endpoint accepts `OPTIONS` preflights and JSON `POST`s. Every
//! response carries permissive CORS headers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::proxy::GeminiProxy;
use crate::{Error, Result};

pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ERROR_LABEL: &str = "Gemini API error";
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<GeminiProxy>,
}

/// Build the router. Exposed separately from [`ProxyServer`] for tests.
pub fn router(proxy: Arc<GeminiProxy>) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/", any(handle_request))
        .route("/gemini-chat", any(handle_request))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { proxy })
}

pub struct ProxyServer {
    host: String,
    port: u16,
    proxy: Arc<GeminiProxy>,
}

impl ProxyServer {
    pub fn new(host: String, port: u16, proxy: GeminiProxy) -> Self {
        Self {
            host,
            port,
            proxy: Arc::new(proxy),
        }
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let app = router(self.proxy);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Proxy server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Proxy server stopped");
        Ok(())
    }
}

async fn handle_request(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        return with_cors("ok".into_response());
    }

    match state.proxy.handle(&body).await {
        Ok(value) => with_cors((StatusCode::OK, Json(value)).into_response()),
        Err(e) => error_response(&e),
    }
}

/// Render any failure as the `{error, details}` envelope.
pub fn error_response(err: &Error) -> Response {
    error!("Proxy request failed: {}", err);

    let status = err
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = serde_json::json!({
        "error": ERROR_LABEL,
        "details": err.details(),
    });

    with_cors((status, Json(body)).into_response())
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    response
}

/// Health check handler
async fn health_check_handler() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
