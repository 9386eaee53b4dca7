//! Slide Deck
//!
//! Markdown slide presentation served over HTTP.
//!
//! - `sections`: the fixed, ordered list of slides
//! - `content`: path-guarded file loader behind `/api/content`
//! - `navigator`: current-slide state machine with ticketed async loads
//! - `markdown`: pulldown-cmark rendering of slide bodies
//! - `api_server` / `web`: axum router, askama pages, HTMX fragments

pub mod config;
pub mod content;
pub mod markdown;
pub mod navigator;
pub mod sections;

#[cfg(feature = "api")]
pub mod api_server;

#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::ServerConfig;
pub use content::{ContentError, ContentLoader, ContentSource};
pub use markdown::{render_markdown, PLACEHOLDER_MARKDOWN};
pub use navigator::{Navigator, NavigatorError, NavigatorState, PendingLoad, View};
pub use sections::{SectionEntry, SECTION_COUNT, SECTION_FILES};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
