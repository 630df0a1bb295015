//! Bookmind Server: HTTP API for bookmark categorization and search.
//!
//! Thin axum server over bookmind_lib. Stateless: every request carries the
//! bookmarks it operates on.
//!
//! Usage:
//!   NVIDIA_NIM_API_KEY=... BOOKMIND_BIND=127.0.0.1:3000 bookmind-server
//!
//! Or with args:
//!   bookmind-server --config /path/to/settings.json --bind 0.0.0.0:3000

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bookmind_lib::models::{bookmarks_from_value, categorized_from_value};
use bookmind_lib::settings::API_KEY_ENV;
use bookmind_lib::{AnalysisResult, BookmarkAnalyzer, BookmindError, CategorizedBookmark, Settings};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

// ============================================================================
// AppState
// ============================================================================

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
    /// Built once at startup so the HTTP client pools connections
    analyzer: Option<Arc<BookmarkAnalyzer>>,
}

impl AppState {
    fn new(settings: Settings) -> Result<Self, BookmindError> {
        let analyzer = if settings.has_api_key() {
            Some(Arc::new(BookmarkAnalyzer::from_settings(&settings)?))
        } else {
            None
        };
        Ok(Self {
            settings: Arc::new(settings),
            analyzer,
        })
    }

    /// The shared analyzer, or a configuration error when no key is set
    fn analyzer(&self) -> Result<Arc<BookmarkAnalyzer>, AppError> {
        self.analyzer.clone().ok_or_else(|| {
            BookmindError::Configuration(format!("{} is not configured.", API_KEY_ENV)).into()
        })
    }
}

// ============================================================================
// Error type
// ============================================================================

struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({"error": self.1}))).into_response()
    }
}

impl From<BookmindError> for AppError {
    fn from(e: BookmindError) -> Self {
        let status = match e {
            BookmindError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookmindError::Validation(_) => StatusCode::BAD_REQUEST,
            BookmindError::Upstream(_) | BookmindError::ResponseFormat(_) => StatusCode::BAD_GATEWAY,
        };
        if status != StatusCode::BAD_REQUEST {
            log::error!("[Server] {}", e);
        }
        AppError(status, e.to_string())
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AskResponse {
    relevant_bookmarks: Vec<CategorizedBookmark>,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    configured: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::from(BookmindError::Validation(format!("Invalid JSON body: {}", e))))
}

// ============================================================================
// Handlers
// ============================================================================

// POST /api/analyze
async fn analyze_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, AppError> {
    let analyzer = state.analyzer()?;
    let payload = parse_body(&body)?;
    let bookmarks = bookmarks_from_value(payload.get("bookmarks").unwrap_or(&Value::Null))?;

    let result = analyzer.analyze(&bookmarks).await?;
    Ok(Json(result))
}

// POST /api/ask
async fn ask_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>, AppError> {
    let analyzer = state.analyzer()?;
    let payload = parse_body(&body)?;
    let query = payload
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| BookmindError::Validation("query must be a string".to_string()))?;
    let bookmarks = categorized_from_value(payload.get("bookmarks").unwrap_or(&Value::Null))?;

    let relevant_bookmarks = analyzer.ask(query, &bookmarks).await?;
    Ok(Json(AskResponse { relevant_bookmarks }))
}

// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        configured: state.settings.has_api_key(),
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse simple args (no clap to keep binary small)
    let args: Vec<String> = std::env::args().collect();
    let mut config_arg: Option<&str> = None;
    let mut bind_arg: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_arg = Some(&args[i + 1]);
                i += 2;
            }
            "--bind" if i + 1 < args.len() => {
                bind_arg = Some(&args[i + 1]);
                i += 2;
            }
            "--help" | "-h" => {
                println!("bookmind-server: bookmark categorization HTTP API");
                println!();
                println!("Usage: bookmind-server [--config PATH] [--bind ADDR:PORT]");
                println!();
                println!("Environment variables:");
                println!("  NVIDIA_NIM_API_KEY  Generator API key");
                println!("  BOOKMIND_ENDPOINT   Chat-completions endpoint");
                println!("  BOOKMIND_MODEL      Model name");
                println!("  BOOKMIND_BIND       Bind address (default: 127.0.0.1:3000)");
                std::process::exit(0);
            }
            _ => { i += 1; }
        }
    }

    let bind_addr = bind_arg
        .map(|s| s.to_string())
        .or_else(|| std::env::var("BOOKMIND_BIND").ok())
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());

    let settings = match Settings::resolve(config_arg.map(PathBuf::from).as_deref()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("[Server] {}", e);
            std::process::exit(1);
        }
    };

    log::info!("[Server] Endpoint: {} (model {})", settings.endpoint, settings.model);
    match settings.masked_api_key() {
        Some(key) => log::info!("[Server] API key: {}", key),
        None => log::warn!("[Server] No API key configured; analyze/ask will fail until one is set"),
    }

    let state = match AppState::new(settings) {
        Ok(s) => s,
        Err(e) => {
            log::error!("[Server] {}", e);
            std::process::exit(1);
        }
    };
    let app = router(state);

    // Bind and serve
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("[Server] Failed to bind to {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    log::info!("[Server] Listening on {}", bind_addr);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("[Server] Server error: {}", e);
        std::process::exit(1);
    }
}
