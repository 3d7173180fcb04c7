//! The host window: document, location, session history, and scroll state.

use std::collections::HashMap;
use std::sync::Arc;

use docnav_dom::{Document, NodeId};
use tracing::debug;
use url::Url;

use crate::geometry::{Geometry, Rect};

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Size of the visible area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Session history entries with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<Url>,
    index: usize,
}

impl History {
    pub fn new(initial: Url) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Add an entry after the current one, dropping any forward entries.
    pub fn push(&mut self, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index = self.entries.len() - 1;
    }

    /// Overwrite the current entry.
    pub fn replace(&mut self, url: Url) {
        self.entries[self.index] = url;
    }

    /// Step back one entry, returning the new current URL.
    pub fn back(&mut self) -> Option<&Url> {
        self.index = self.index.checked_sub(1)?;
        Some(&self.entries[self.index])
    }

    /// Step forward one entry, returning the new current URL.
    pub fn forward(&mut self) -> Option<&Url> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    pub fn current(&self) -> &Url {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Everything a page script can see of its browsing context.
pub struct Window {
    document: Document,
    location: Url,
    history: History,
    viewport: Viewport,
    scroll_y: f64,
    anchor: Option<String>,
    element_scroll: HashMap<NodeId, f64>,
    hard_navigation: Option<Url>,
    geometry: Arc<dyn Geometry>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("location", &self.location.as_str())
            .field("history", &self.history.len())
            .field("viewport", &self.viewport)
            .field("scroll_y", &self.scroll_y)
            .field("hard_navigation", &self.hard_navigation)
            .finish_non_exhaustive()
    }
}

impl Window {
    pub fn new(
        document: Document,
        history: History,
        viewport: Viewport,
        geometry: Arc<dyn Geometry>,
    ) -> Self {
        Self {
            document,
            location: history.current().clone(),
            history,
            viewport,
            scroll_y: 0.0,
            anchor: None,
            element_scroll: HashMap::new(),
            hard_navigation: None,
            geometry,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // -----------------------------------------------------------------------
    // History API
    // -----------------------------------------------------------------------

    /// `history.pushState`: new entry, location updated, no load.
    pub fn push_state(&mut self, url: Url) {
        self.history.push(url.clone());
        self.location = url;
    }

    /// `history.replaceState`.
    pub fn replace_state(&mut self, url: Url) {
        self.history.replace(url.clone());
        self.location = url;
    }

    /// Move the history cursor back; the location follows immediately.
    pub fn history_back(&mut self) -> Option<Url> {
        let url = self.history.back()?.clone();
        self.location = url.clone();
        Some(url)
    }

    /// Move the history cursor forward; the location follows immediately.
    pub fn history_forward(&mut self) -> Option<Url> {
        let url = self.history.forward()?.clone();
        self.location = url.clone();
        Some(url)
    }

    // -----------------------------------------------------------------------
    // Full navigations
    // -----------------------------------------------------------------------

    /// `location.assign`: ask the host to load `url` from scratch.
    pub fn assign(&mut self, url: Url) {
        debug!(%url, "hard navigation requested");
        self.hard_navigation = Some(url);
    }

    pub fn pending_hard_navigation(&self) -> Option<&Url> {
        self.hard_navigation.as_ref()
    }

    pub fn take_hard_navigation(&mut self) -> Option<Url> {
        self.hard_navigation.take()
    }

    // -----------------------------------------------------------------------
    // Layout and scrolling
    // -----------------------------------------------------------------------

    /// The element's box, if the geometry knows it.
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.geometry.rect(&self.document, node)
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// The element id the last anchor jump targeted, cleared by plain scrolls.
    pub fn scrolled_anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
        self.anchor = None;
    }

    /// Bring an element to the top of the viewport.
    pub fn scroll_into_view(&mut self, node: NodeId) {
        if let Some(rect) = self.rect(node) {
            self.scroll_y = rect.top.max(0.0);
        }
        self.anchor = self
            .document
            .element(node)
            .and_then(|el| el.id())
            .map(str::to_string);
    }

    /// `scrollTop` of a scrollable element.
    pub fn element_scroll_top(&self, node: NodeId) -> f64 {
        self.element_scroll.get(&node).copied().unwrap_or(0.0)
    }

    pub fn set_element_scroll_top(&mut self, node: NodeId, top: f64) {
        self.element_scroll.insert(node, top.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FixedLayout, NoLayout};

    fn url(path: &str) -> Url {
        Url::parse("https://docs.example.com").unwrap().join(path).unwrap()
    }

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = History::new(url("/a"));
        history.push(url("/b"));
        history.push(url("/c"));
        assert_eq!(history.back().unwrap().path(), "/b");

        history.push(url("/d"));
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().path(), "/d");
        assert!(history.forward().is_none());
    }

    #[test]
    fn back_and_forward_move_location() {
        let mut window = Window::new(
            Document::new(),
            History::new(url("/a")),
            Viewport::default(),
            Arc::new(NoLayout),
        );
        window.push_state(url("/b"));
        assert_eq!(window.location().path(), "/b");

        assert_eq!(window.history_back().unwrap().path(), "/a");
        assert_eq!(window.location().path(), "/a");
        assert!(window.history_back().is_none());

        assert_eq!(window.history_forward().unwrap().path(), "/b");
        assert_eq!(window.history().index(), 1);
    }

    #[test]
    fn scroll_into_view_uses_geometry() {
        let doc = Document::parse(r#"<html><body><h2 id="usage">Usage</h2></body></html>"#);
        let target = doc.get_element_by_id("usage").unwrap();
        let layout = FixedLayout::new().with("usage", Rect::new(900.0, 40.0));
        let mut window = Window::new(
            doc,
            History::new(url("/guide")),
            Viewport::default(),
            Arc::new(layout),
        );

        window.scroll_into_view(target);
        assert_eq!(window.scroll_y(), 900.0);
        assert_eq!(window.scrolled_anchor(), Some("usage"));

        window.scroll_to(-5.0);
        assert_eq!(window.scroll_y(), 0.0);
        assert_eq!(window.scrolled_anchor(), None);
    }
}
