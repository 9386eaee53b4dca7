// Page handlers for HTML rendering with Askama

use axum::extract::{rejection::QueryRejection, Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use askama::Template;
use axum_htmx::HxRequest;
use std::sync::Arc;

use crate::api_server::{AppError, AppState};
use crate::markdown::render_markdown;
use crate::navigator::{Navigator, NavigatorState};
use crate::sections::{clamp_index, DECK_TITLE};
use crate::content::ContentLoader;

fn render_html<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template error: {}", e);
        format!("Template error: {}", e)
    }))
}

// ============================================================================
// Home Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub section_count: usize,
}

pub async fn home_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = HomeTemplate {
        title: DECK_TITLE.to_string(),
        section_count: state.sections.len(),
    };
    render_html(&template)
}

// ============================================================================
// Presentation
// ============================================================================

/// Everything one slide needs, shared by the full page and the HTMX fragment
pub struct SlideView {
    pub title: &'static str,
    /// 1-based position for display
    pub number: usize,
    pub count: usize,
    pub progress_percent: usize,
    pub body_html: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub finish_href: Option<String>,
}

impl SlideView {
    fn from_navigator(navigator: &Navigator<Arc<ContentLoader>>, state: &NavigatorState) -> Self {
        let index = state.current_index;
        let count = navigator.sections().len();
        let href = |i: usize| format!("/presentation?section={}", i);

        Self {
            title: navigator.current_section().title,
            number: index + 1,
            count,
            progress_percent: (index + 1) * 100 / count,
            body_html: render_markdown(&state.content),
            prev_href: navigator.peek_previous().map(href),
            next_href: navigator.peek_next().map(href),
            finish_href: navigator
                .is_last()
                .then(|| format!("/presentation/finish?section={}", index)),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/presentation.html")]
pub struct PresentationTemplate {
    pub title: String,
    pub slide: SlideView,
}

/// Slide body alone, swapped in by HTMX on Previous/Next
#[derive(Template)]
#[template(path = "partials/slide.html")]
pub struct SlideTemplate {
    pub slide: SlideView,
}

#[derive(serde::Deserialize, Debug, Default)]
pub struct SectionQuery {
    section: Option<usize>,
}

fn requested_section(query: Result<Query<SectionQuery>, QueryRejection>) -> usize {
    query.ok().and_then(|Query(q)| q.section).unwrap_or(0)
}

/// GET /presentation?section=3
///
/// Out-of-range sections are clamped to the last one. HTMX requests get only
/// the slide fragment.
pub async fn presentation_page(
    State(state): State<AppState>,
    HxRequest(is_htmx): HxRequest,
    query: Result<Query<SectionQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let index = clamp_index(state.sections, requested_section(query));
    let navigator = Navigator::starting_at(Arc::clone(&state.loader), state.sections, index)?;

    let loaded = navigator.loaded().await;
    let slide = SlideView::from_navigator(&navigator, &loaded);

    tracing::debug!("Rendering section {} of {} (htmx: {})", slide.number, slide.count, is_htmx);

    if is_htmx {
        return Ok(render_html(&SlideTemplate { slide }));
    }

    Ok(render_html(&PresentationTemplate {
        title: format!("{} · {}", slide.title, DECK_TITLE),
        slide,
    }))
}

/// GET /presentation/finish?section=14
///
/// Only the last section may finish; anything else goes back to its slide.
pub async fn finish_presentation(
    State(state): State<AppState>,
    query: Result<Query<SectionQuery>, QueryRejection>,
) -> Result<Redirect, AppError> {
    let index = clamp_index(state.sections, requested_section(query));
    let navigator = Navigator::idle_at(Arc::clone(&state.loader), state.sections, index)?;

    match navigator.finish() {
        Ok(()) => Ok(Redirect::to("/thank-you")),
        Err(e) => {
            tracing::debug!("Finish refused: {}", e);
            Ok(Redirect::to(&format!("/presentation?section={}", index)))
        }
    }
}

// ============================================================================
// Thank-you Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/thank_you.html")]
pub struct ThankYouTemplate {
    pub title: String,
    pub section_count: usize,
}

pub async fn thank_you_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = ThankYouTemplate {
        title: DECK_TITLE.to_string(),
        section_count: state.sections.len(),
    };
    render_html(&template)
}
