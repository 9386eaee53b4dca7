//! Markdown rendering for slide bodies
//!
//! pulldown-cmark with the GitHub-style extensions the deck uses. Fenced code
//! blocks come out as `<pre><code class="language-xxx">` so the page's
//! highlighter can pick them up.

use pulldown_cmark::{html, Options, Parser};

/// Shown in place of a section whose text could not be loaded
pub const PLACEHOLDER_MARKDOWN: &str =
    "# Content unavailable\n\nThe content for this section could not be loaded.\n";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

/// Render Markdown source to an HTML fragment
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    // Rendered HTML is usually a bit larger than the source
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}
