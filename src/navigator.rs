//! Presentation Navigator
//!
//! Tracks which section is on screen and loads its text through a
//! [`ContentSource`]. Every index change spawns one fetch; observers follow
//! the state through a `watch` channel.
//!
//! Loads are ticketed: a completion whose ticket is no longer the newest is
//! dropped, so quick Next/Next presses always settle on the last section
//! requested even when an earlier fetch resolves later.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::content::ContentSource;
use crate::markdown::PLACEHOLDER_MARKDOWN;
use crate::sections::SectionEntry;

// ============================================================================
// State
// ============================================================================

/// Which page the presentation is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Presentation,
    ThankYou,
}

/// Snapshot published to observers after every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorState {
    /// Always a valid index into the navigator's sections
    pub current_index: usize,
    /// Markdown of the current section, or the placeholder after a failed load
    pub content: String,
    pub loading: bool,
    pub view: View,
    /// Vertical scroll position; reset to 0 by advance and retreat
    pub scroll_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigatorError {
    #[error("presentation has no sections")]
    Empty,

    #[error("section index {index} out of range (0..{count})")]
    OutOfRange { index: usize, count: usize },

    #[error("finish is only available on the last section (at {index} of {count})")]
    NotAtLastSection { index: usize, count: usize },
}

struct Shared<S> {
    source: S,
    sections: &'static [SectionEntry],
    state: watch::Sender<NavigatorState>,
    latest_ticket: AtomicU64,
}

// ============================================================================
// Navigator
// ============================================================================

pub struct Navigator<S: ContentSource> {
    shared: Arc<Shared<S>>,
}

/// Handle to a spawned section load
#[must_use = "dropping a PendingLoad detaches it; the load still runs"]
pub struct PendingLoad {
    index: usize,
    handle: JoinHandle<()>,
}

impl PendingLoad {
    /// Section index this load was issued for
    pub fn index(&self) -> usize {
        self.index
    }

    /// Wait until the fetch has completed and its result was applied or discarded
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!("Section {} load task failed: {}", self.index, e);
        }
    }
}

impl<S: ContentSource> Navigator<S> {
    /// Mount at the first section. Must be called inside a tokio runtime.
    pub fn new(source: S, sections: &'static [SectionEntry]) -> Result<Self, NavigatorError> {
        Self::starting_at(source, sections, 0)
    }

    /// Mount at `index` and start loading it
    pub fn starting_at(
        source: S,
        sections: &'static [SectionEntry],
        index: usize,
    ) -> Result<Self, NavigatorError> {
        let navigator = Self::idle_at(source, sections, index)?;

        // Initial mount load; observers wait on the loading flag
        drop(navigator.reload());

        Ok(navigator)
    }

    /// Position at `index` without fetching anything
    ///
    /// Content stays empty and `loading` false until [`Navigator::reload`] or
    /// a navigation issues a load. Needs no runtime.
    pub fn idle_at(
        source: S,
        sections: &'static [SectionEntry],
        index: usize,
    ) -> Result<Self, NavigatorError> {
        if sections.is_empty() {
            return Err(NavigatorError::Empty);
        }
        if index >= sections.len() {
            return Err(NavigatorError::OutOfRange {
                index,
                count: sections.len(),
            });
        }

        let (state, _) = watch::channel(NavigatorState {
            current_index: index,
            content: String::new(),
            loading: false,
            view: View::Presentation,
            scroll_offset: 0,
        });

        Ok(Self {
            shared: Arc::new(Shared {
                source,
                sections,
                state,
                latest_ticket: AtomicU64::new(0),
            }),
        })
    }

    pub fn sections(&self) -> &'static [SectionEntry] {
        self.shared.sections
    }

    /// Current snapshot
    pub fn state(&self) -> NavigatorState {
        self.shared.state.borrow().clone()
    }

    pub fn current_index(&self) -> usize {
        self.shared.state.borrow().current_index
    }

    pub fn current_section(&self) -> &'static SectionEntry {
        &self.shared.sections[self.current_index()]
    }

    pub fn has_previous(&self) -> bool {
        self.peek_previous().is_some()
    }

    pub fn has_next(&self) -> bool {
        self.peek_next().is_some()
    }

    /// Index [`Navigator::advance`] would move to, without moving
    pub fn peek_next(&self) -> Option<usize> {
        self.next_index(self.current_index())
    }

    /// Index [`Navigator::retreat`] would move to, without moving
    pub fn peek_previous(&self) -> Option<usize> {
        Self::previous_index(self.current_index())
    }

    /// True on the only index where [`Navigator::finish`] is actionable
    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<NavigatorState> {
        self.shared.state.subscribe()
    }

    /// Wait until no load is outstanding and return that state
    pub async fn loaded(&self) -> NavigatorState {
        let mut rx = self.shared.state.subscribe();
        let loaded = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        loaded
    }

    /// Move to the next section. No-op on the last one. Scroll always resets.
    pub fn advance(&self) -> Option<PendingLoad> {
        self.navigate(|index| self.next_index(index))
    }

    /// Move to the previous section. No-op on the first one. Scroll always resets.
    pub fn retreat(&self) -> Option<PendingLoad> {
        self.navigate(Self::previous_index)
    }

    /// Switch to the thank-you view; only valid on the last section
    pub fn finish(&self) -> Result<(), NavigatorError> {
        let count = self.shared.sections.len();
        let mut result = Ok(());

        self.shared.state.send_if_modified(|state| {
            if state.current_index + 1 == count {
                state.view = View::ThankYou;
                true
            } else {
                result = Err(NavigatorError::NotAtLastSection {
                    index: state.current_index,
                    count,
                });
                false
            }
        });

        if result.is_ok() {
            tracing::debug!("Presentation finished");
        }
        result
    }

    /// Record a scroll position reported by the view
    pub fn scroll_to(&self, offset: u32) {
        self.shared.state.send_if_modified(|state| {
            let changed = state.scroll_offset != offset;
            state.scroll_offset = offset;
            changed
        });
    }

    /// Fetch the current section again
    pub fn reload(&self) -> PendingLoad {
        let mut issued = (0, 0);
        self.shared.state.send_modify(|state| {
            state.loading = true;
            issued = (state.current_index, self.next_ticket());
        });
        self.spawn_load(issued.0, issued.1)
    }

    fn navigate(&self, step: impl FnOnce(usize) -> Option<usize>) -> Option<PendingLoad> {
        let mut issued = None;

        // Index change and ticket issue happen under the same write lock
        self.shared.state.send_modify(|state| {
            state.scroll_offset = 0;
            if let Some(next) = step(state.current_index) {
                state.current_index = next;
                state.loading = true;
                issued = Some((next, self.next_ticket()));
            }
        });

        match issued {
            Some((index, ticket)) => {
                tracing::debug!("Navigating to section {}", index);
                Some(self.spawn_load(index, ticket))
            }
            None => None,
        }
    }

    fn next_index(&self, index: usize) -> Option<usize> {
        (index + 1 < self.shared.sections.len()).then(|| index + 1)
    }

    fn previous_index(index: usize) -> Option<usize> {
        index.checked_sub(1)
    }

    fn next_ticket(&self) -> u64 {
        self.shared.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn_load(&self, index: usize, ticket: u64) -> PendingLoad {
        let shared = Arc::clone(&self.shared);
        let path = shared.sections[index].path;

        let handle = tokio::spawn(async move {
            let content = match shared.source.fetch(path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Section {} ({}) could not be loaded: {}", index, path, e);
                    PLACEHOLDER_MARKDOWN.to_string()
                }
            };

            let applied = shared.state.send_if_modified(|state| {
                let latest = shared.latest_ticket.load(Ordering::SeqCst);
                if ticket != latest || state.current_index != index {
                    return false;
                }
                state.content = content;
                state.loading = false;
                true
            });

            if !applied {
                tracing::debug!("Discarded stale load of section {} (ticket {})", index, ticket);
            }
        });

        PendingLoad { index, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentError;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    const DECK: &[SectionEntry] = &[
        SectionEntry::new("Zero", "zero.md"),
        SectionEntry::new("One", "one.md"),
        SectionEntry::new("Two", "two.md"),
        SectionEntry::new("Three", "three.md"),
    ];

    /// In-memory source; a path with a gate waits until the gate is released
    #[derive(Default)]
    struct GatedSource {
        texts: HashMap<&'static str, &'static str>,
        gates: Mutex<HashMap<&'static str, oneshot::Receiver<()>>>,
    }

    impl GatedSource {
        fn deck() -> Self {
            let texts = DECK
                .iter()
                .map(|s| (s.path, s.title))
                .collect::<HashMap<_, _>>();
            Self {
                texts,
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, path: &'static str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(path, rx);
            tx
        }
    }

    impl ContentSource for GatedSource {
        fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ContentError>> + Send {
            let gate = self.gates.lock().unwrap().remove(path);
            let text = self.texts.get(path).map(|t| t.to_string());
            let path = path.to_string();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                text.ok_or_else(|| ContentError::NotFound {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_mount_loads_first_section() {
        let nav = Navigator::new(GatedSource::deck(), DECK).unwrap();
        let state = nav.loaded().await;

        assert_eq!(state.current_index, 0);
        assert_eq!(state.content, "Zero");
        assert!(!state.loading);
        assert_eq!(state.view, View::Presentation);

        // Already settled: returns at once with the same snapshot
        assert_eq!(nav.loaded().await, state);
    }

    #[tokio::test]
    async fn test_peek_matches_advance_and_retreat() {
        let nav = Navigator::starting_at(GatedSource::deck(), DECK, 1).unwrap();
        nav.loaded().await;
        assert_eq!((nav.peek_previous(), nav.peek_next()), (Some(0), Some(2)));

        let expected = nav.peek_next();
        nav.advance().unwrap().settled().await;
        assert_eq!(Some(nav.current_index()), expected);

        nav.advance().unwrap().settled().await;
        assert_eq!(nav.peek_next(), None);
        assert!(nav.advance().is_none());

        let expected = nav.peek_previous();
        nav.retreat().unwrap().settled().await;
        assert_eq!(Some(nav.current_index()), expected);
    }

    #[test]
    fn test_idle_navigator_does_not_load() {
        // No runtime here: idle_at must not spawn
        let nav = Navigator::idle_at(GatedSource::deck(), DECK, 3).unwrap();
        let state = nav.state();
        assert_eq!(state.current_index, 3);
        assert!(!state.loading);
        assert!(state.content.is_empty());
        assert_eq!(nav.finish(), Ok(()));
        assert_eq!(nav.state().view, View::ThankYou);

        let early = Navigator::idle_at(GatedSource::deck(), DECK, 0).unwrap();
        assert!(early.finish().is_err());
        assert_eq!(
            Navigator::idle_at(GatedSource::deck(), DECK, 9).err(),
            Some(NavigatorError::OutOfRange { index: 9, count: 4 })
        );
    }

    #[tokio::test]
    async fn test_empty_and_out_of_range_rejected() {
        assert_eq!(
            Navigator::new(GatedSource::default(), &[]).err(),
            Some(NavigatorError::Empty)
        );
        assert_eq!(
            Navigator::starting_at(GatedSource::deck(), DECK, 4).err(),
            Some(NavigatorError::OutOfRange { index: 4, count: 4 })
        );
    }

    #[tokio::test]
    async fn test_retreat_at_first_section_is_noop() {
        let nav = Navigator::new(GatedSource::deck(), DECK).unwrap();
        nav.loaded().await;
        nav.scroll_to(420);

        assert!(nav.retreat().is_none());

        let state = nav.state();
        assert_eq!(state.current_index, 0);
        assert_eq!(state.content, "Zero");
        assert_eq!(state.scroll_offset, 0, "scroll resets even on a no-op");
    }

    #[tokio::test]
    async fn test_advance_at_last_section_is_noop() {
        let nav = Navigator::starting_at(GatedSource::deck(), DECK, 3).unwrap();
        nav.loaded().await;
        nav.scroll_to(90);

        assert!(nav.advance().is_none());
        assert_eq!(nav.current_index(), 3);
        assert_eq!(nav.state().scroll_offset, 0);
        assert!(nav.is_last());
    }

    #[tokio::test]
    async fn test_advance_and_retreat_load_content() {
        let nav = Navigator::new(GatedSource::deck(), DECK).unwrap();
        nav.loaded().await;

        nav.advance().unwrap().settled().await;
        assert_eq!(nav.state().content, "One");
        assert!(nav.has_previous());

        nav.retreat().unwrap().settled().await;
        let state = nav.state();
        assert_eq!(state.current_index, 0);
        assert_eq!(state.content, "Zero");
    }

    #[tokio::test]
    async fn test_finish_only_on_last_section() {
        let nav = Navigator::starting_at(GatedSource::deck(), DECK, 2).unwrap();
        assert_eq!(
            nav.finish(),
            Err(NavigatorError::NotAtLastSection { index: 2, count: 4 })
        );
        assert_eq!(nav.state().view, View::Presentation);

        nav.advance().unwrap().settled().await;
        assert_eq!(nav.finish(), Ok(()));

        let state = nav.state();
        assert_eq!(state.view, View::ThankYou);
        assert_eq!(state.current_index, 3, "finish does not move the index");
    }

    #[tokio::test]
    async fn test_failed_load_shows_placeholder() {
        const BROKEN: &[SectionEntry] = &[SectionEntry::new("Gone", "gone.md")];
        let nav = Navigator::new(GatedSource::deck(), BROKEN).unwrap();

        let state = nav.loaded().await;
        assert_eq!(state.content, PLACEHOLDER_MARKDOWN);
        assert!(!state.loading);
    }

    // Two quick advances: the slow fetch for section 2 resolves after the
    // fast one for section 3. The stale result must not replace section 3.
    #[tokio::test]
    async fn test_slow_earlier_load_does_not_overwrite_newer_section() {
        let source = GatedSource::deck();
        let release_two = source.gate("two.md");
        let nav = Navigator::starting_at(source, DECK, 1).unwrap();
        nav.loaded().await;

        let slow = nav.advance().unwrap();
        let fast = nav.advance().unwrap();
        assert_eq!((slow.index(), fast.index()), (2, 3));

        fast.settled().await;
        assert_eq!(nav.state().content, "Three");
        assert!(!nav.state().loading);

        release_two.send(()).unwrap();
        slow.settled().await;

        let state = nav.state();
        assert_eq!(state.current_index, 3);
        assert_eq!(state.content, "Three");
    }

    #[tokio::test]
    async fn test_loading_stays_set_until_newest_load_lands() {
        let source = GatedSource::deck();
        let release_three = source.gate("three.md");
        let nav = Navigator::starting_at(source, DECK, 1).unwrap();
        nav.loaded().await;

        let first = nav.advance().unwrap();
        let second = nav.advance().unwrap();

        first.settled().await;
        let state = nav.state();
        assert!(state.loading, "section 2 result is stale once 3 was requested");
        assert_eq!(state.content, "One");

        release_three.send(()).unwrap();
        second.settled().await;
        assert_eq!(nav.state().content, "Three");
        assert!(!nav.state().loading);
    }

    #[tokio::test]
    async fn test_subscribers_see_navigation() {
        let nav = Navigator::new(GatedSource::deck(), DECK).unwrap();
        nav.loaded().await;
        let mut rx = nav.subscribe();
        let _ = rx.borrow_and_update();

        nav.advance().unwrap().settled().await;

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.current_index, 1);
        assert_eq!(seen.content, "One");
    }
}
