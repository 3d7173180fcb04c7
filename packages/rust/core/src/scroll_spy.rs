//! Highlights the outline entry for the section being read.
//!
//! A section counts as being read while its target element overlaps the
//! reading band: from 100px below the top of the viewport down to 40% of the
//! viewport height. Evaluations behave like an intersection observer: the
//! first reports every target, later ones only targets whose state flipped,
//! and among the targets that just entered the band the last one wins.

use tracing::{debug, trace};

use docnav_dom::NodeId;

use crate::selectors::TOC_LINK_CLASS;
use crate::toc::OutlineItem;
use crate::window::Window;

/// Top inset of the reading band, in pixels.
pub const BAND_TOP_INSET: f64 = 100.0;

/// Bottom edge of the reading band, as a fraction of viewport height.
pub const BAND_BOTTOM_FRACTION: f64 = 0.4;

const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone)]
struct Watched {
    id: String,
    target: NodeId,
    link: NodeId,
    intersecting: bool,
}

/// Observes one page's outline targets.
#[derive(Debug)]
pub struct ScrollSpy {
    watched: Vec<Watched>,
    container: Option<NodeId>,
    primed: bool,
    active: Option<String>,
}

impl ScrollSpy {
    pub(crate) fn observe(items: &[OutlineItem], container: Option<NodeId>) -> Self {
        Self {
            watched: items
                .iter()
                .map(|item| Watched {
                    id: item.entry.id.clone(),
                    target: item.target,
                    link: item.link,
                    intersecting: false,
                })
                .collect(),
            container,
            primed: false,
            active: None,
        }
    }

    /// Id of the highlighted entry.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn watched(&self) -> usize {
        self.watched.len()
    }

    /// Re-check every target against the band at the current scroll offset.
    pub(crate) fn evaluate(&mut self, window: &mut Window) -> Option<&str> {
        let top = window.scroll_y() + BAND_TOP_INSET;
        let bottom = window.scroll_y() + f64::from(window.viewport().height) * BAND_BOTTOM_FRACTION;

        let mut entered = None;
        for (idx, watched) in self.watched.iter_mut().enumerate() {
            let now = top < bottom
                && window
                    .rect(watched.target)
                    .is_some_and(|r| r.top < bottom && r.bottom() > top);
            let changed = !self.primed || now != watched.intersecting;
            watched.intersecting = now;
            if changed && now {
                entered = Some(idx);
            }
        }
        self.primed = true;

        if let Some(idx) = entered {
            self.activate(window, idx);
        }
        self.active()
    }

    fn activate(&mut self, window: &mut Window, idx: usize) {
        let doc = window.document_mut();
        for watched in &self.watched {
            if let Some(el) = doc.element_mut(watched.link) {
                el.remove_class(ACTIVE_CLASS);
            }
        }
        let link = self.watched[idx].link;
        let Some(el) = doc.element_mut(link) else {
            return;
        };
        if !el.has_class(TOC_LINK_CLASS) {
            return;
        }
        el.add_class(ACTIVE_CLASS);
        self.active = Some(self.watched[idx].id.clone());
        trace!(id = %self.watched[idx].id, "outline entry activated");

        if let Some(container) = self.container {
            reveal_nearest(window, container, link);
        }
    }

    /// Stop observing. Consumes the spy so a torn-down observer can't fire.
    pub(crate) fn disconnect(self) {
        debug!(targets = self.watched.len(), "scroll spy disconnected");
    }
}

/// Scroll `container` by the least amount that shows `node`.
fn reveal_nearest(window: &mut Window, container: NodeId, node: NodeId) {
    let (Some(outer), Some(inner)) = (window.rect(container), window.rect(node)) else {
        return;
    };
    let scroll = window.element_scroll_top(container);
    let view_top = outer.top + scroll;
    let view_bottom = view_top + outer.height;

    let next = if inner.top < view_top {
        inner.top - outer.top
    } else if inner.bottom() > view_bottom {
        inner.bottom() - outer.top - outer.height
    } else {
        return;
    };
    window.set_element_scroll_top(container, next);
}
