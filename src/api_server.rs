// Axum server module
//
// Purpose: content loader endpoint, section listing and the presentation pages
// Usage: cargo run --bin slide_server

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::content::{ContentError, ContentLoader};
use crate::navigator::NavigatorError;
use crate::sections::{SectionEntry, SECTION_FILES};
use crate::web::handlers::pages;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ContentLoader>,
    pub sections: &'static [SectionEntry],
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_sections(config, SECTION_FILES)
    }

    pub fn with_sections(config: &ServerConfig, sections: &'static [SectionEntry]) -> Self {
        tracing::info!(
            "Serving {} sections from {}",
            sections.len(),
            config.content_root.display()
        );

        // Missing files degrade to the placeholder at view time; flag them early
        for entry in sections {
            let path = config.content_root.join(entry.path);
            if !path.is_file() {
                tracing::warn!("Section '{}' has no file at {}", entry.title, path.display());
            }
        }

        Self {
            loader: Arc::new(ContentLoader::new(config.content_root.clone())),
            sections,
            static_dir: config.static_dir.clone(),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Content loader (JSON API)
        .route("/api/content", get(get_content))
        .route("/api/sections", get(list_sections))

        // Pages
        .route("/", get(pages::home_page))
        .route("/presentation", get(pages::presentation_page))
        .route("/presentation/finish", get(pages::finish_presentation))
        .route("/thank-you", get(pages::thank_you_page))
        .nest_service("/static", static_files)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(serde::Deserialize, Debug)]
struct ContentQuery {
    path: Option<String>,
}

/// GET /api/content?path=content/01-introduction.md
///
/// Returns the file text unmodified under `content`. A missing, empty or
/// `..`-bearing path is a 400, an unreadable file a 404.
async fn get_content(
    State(state): State<AppState>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = query
        .ok()
        .and_then(|Query(params)| params.path)
        .ok_or(ContentError::InvalidPath)?;

    let content = state.loader.load(&path).await?;

    Ok(Json(serde_json::json!({
        "content": content
    })))
}

/// Section metadata in presentation order
async fn list_sections(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sections: Vec<serde_json::Value> = state
        .sections
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::json!({
                "index": index,
                "title": entry.title,
                "path": entry.path,
                "content_url": format!("/api/content?path={}", urlencoding::encode(entry.path)),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": sections.len(),
        "sections": sections,
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidPath => AppError::BadRequest(err.to_string()),
            ContentError::NotFound { .. } => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<NavigatorError> for AppError {
    fn from(err: NavigatorError) -> Self {
        AppError::Internal(format!("Navigator error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
