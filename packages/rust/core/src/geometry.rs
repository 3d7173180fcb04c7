//! Layout seam.
//!
//! There is no layout engine in a headless host, so element boxes come from a
//! [`Geometry`] implementation: [`NoLayout`] when nothing is laid out, or
//! [`FixedLayout`] when the caller knows where things are.

use std::collections::HashMap;

use docnav_dom::{Document, NodeId};

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Supplies element boxes.
pub trait Geometry: Send + Sync {
    /// The element's box in unscrolled document coordinates, if it is laid out.
    fn rect(&self, doc: &Document, node: NodeId) -> Option<Rect>;
}

/// Nothing is laid out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl Geometry for NoLayout {
    fn rect(&self, _doc: &Document, _node: NodeId) -> Option<Rect> {
        None
    }
}

/// Boxes keyed by element id, or by `href` for elements without one.
///
/// Keys survive content swaps, which node handles do not.
#[derive(Debug, Clone, Default)]
pub struct FixedLayout {
    boxes: HashMap<String, Rect>,
}

impl FixedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, key: impl Into<String>, rect: Rect) -> Self {
        self.insert(key, rect);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, rect: Rect) {
        self.boxes.insert(key.into(), rect);
    }
}

impl Geometry for FixedLayout {
    fn rect(&self, doc: &Document, node: NodeId) -> Option<Rect> {
        let el = doc.element(node)?;
        if let Some(rect) = el.id().and_then(|id| self.boxes.get(id)) {
            return Some(*rect);
        }
        el.attr("href").and_then(|href| self.boxes.get(href)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_layout_prefers_id_then_href() {
        let doc = Document::parse(
            r##"<html><body><h2 id="intro">Intro</h2><a href="#intro">x</a><p>none</p></body></html>"##,
        );
        let layout = FixedLayout::new()
            .with("intro", Rect::new(400.0, 30.0))
            .with("#intro", Rect::new(50.0, 20.0));

        let body = doc.body().unwrap();
        let kids = doc.element_children(body);
        assert_eq!(layout.rect(&doc, kids[0]), Some(Rect::new(400.0, 30.0)));
        assert_eq!(layout.rect(&doc, kids[1]), Some(Rect::new(50.0, 20.0)));
        assert_eq!(layout.rect(&doc, kids[2]), None);
        assert_eq!(Rect::new(400.0, 30.0).bottom(), 430.0);
    }
}
