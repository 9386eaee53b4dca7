//! Section Registry
//!
//! The ordered list of slides shown by the presentation. Paths are relative to
//! the configured content root and are served verbatim by the content loader.

/// One titled Markdown document shown as a single slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub title: &'static str,
    pub path: &'static str,
}

impl SectionEntry {
    pub const fn new(title: &'static str, path: &'static str) -> Self {
        Self { title, path }
    }
}

/// Shown on the landing and thank-you pages
pub const DECK_TITLE: &str = "Rust in Practice";

/// Presentation order. Index 0 is shown first, the last entry enables Finish.
pub const SECTION_FILES: &[SectionEntry] = &[
    SectionEntry::new("Introduction", "content/01-introduction.md"),
    SectionEntry::new("Getting Started", "content/02-getting-started.md"),
    SectionEntry::new("Ownership and Borrowing", "content/03-ownership.md"),
    SectionEntry::new("Structs and Enums", "content/04-structs-enums.md"),
    SectionEntry::new("Pattern Matching", "content/05-pattern-matching.md"),
    SectionEntry::new("Error Handling", "content/06-error-handling.md"),
    SectionEntry::new("Traits and Generics", "content/07-traits-generics.md"),
    SectionEntry::new("Collections and Iterators", "content/08-collections.md"),
    SectionEntry::new("Modules and Crates", "content/09-modules-crates.md"),
    SectionEntry::new("Async Basics", "content/10-async.md"),
    SectionEntry::new("Building an HTTP Service", "content/11-http-service.md"),
    SectionEntry::new("Templates and Markdown", "content/12-templates.md"),
    SectionEntry::new("Testing", "content/13-testing.md"),
    SectionEntry::new("Deployment", "content/14-deployment.md"),
    SectionEntry::new("Wrap-up", "content/15-wrap-up.md"),
];

/// Number of sections in the deck
pub const SECTION_COUNT: usize = SECTION_FILES.len();

/// Clamp an arbitrary index into the valid range of `sections`
///
/// Returns 0 for an empty slice; callers that need a valid entry must check
/// emptiness themselves.
pub fn clamp_index(sections: &[SectionEntry], index: usize) -> usize {
    index.min(sections.len().saturating_sub(1))
}
