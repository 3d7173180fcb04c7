//! Sidebar navigation state: the active link and the sidebar's scroll offset.

use tracing::trace;

use docnav_dom::{Document, Selector};

use crate::window::Window;

const ACTIVE_CLASS: &str = "active";

/// The `href` a sidebar link uses for `path`.
pub fn nav_href(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Move the active marker to the nav link for `path`.
///
/// Returns whether a matching link was found. Either way no other link keeps
/// the marker.
pub(crate) fn mark_active_link(doc: &mut Document, nav_link: &Selector, path: &str) -> bool {
    let href = nav_href(path);
    let root = doc.root();
    let mut found = false;
    for link in doc.select(root, nav_link) {
        let Some(el) = doc.element_mut(link) else {
            continue;
        };
        if el.attr("href") == Some(href.as_str()) && !found {
            el.add_class(ACTIVE_CLASS);
            found = true;
        } else {
            el.remove_class(ACTIVE_CLASS);
        }
    }
    trace!(%href, found, "active nav link updated");
    found
}

/// Scroll the sidebar so its active link sits mid-height.
pub(crate) fn center_active_link(window: &mut Window, sidebar: &Selector, nav_link: &Selector) {
    let doc = window.document();
    let root = doc.root();
    let Some(sidebar_el) = doc.select_first(root, sidebar) else {
        return;
    };
    let Some(link) = doc
        .select(root, nav_link)
        .into_iter()
        .find(|&n| doc.element(n).is_some_and(|el| el.has_class(ACTIVE_CLASS)))
    else {
        return;
    };
    let (Some(outer), Some(inner)) = (window.rect(sidebar_el), window.rect(link)) else {
        return;
    };

    let offset = inner.top - outer.top - outer.height / 2.0;
    window.set_element_scroll_top(sidebar_el, offset);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::{FixedLayout, Rect};
    use crate::window::{History, Viewport};

    const PAGE: &str = r#"<html><body><nav id="sidebar">
<a class="nav-link active" href="/">Home</a>
<a class="nav-link" href="/guide">Guide</a>
<a class="nav-link" href="/guide/setup">Setup</a>
</nav></body></html>"#;

    fn selectors() -> (Selector, Selector) {
        (
            Selector::parse("#sidebar").unwrap(),
            Selector::parse(".nav-link").unwrap(),
        )
    }

    fn active(doc: &Document) -> Vec<String> {
        doc.select(doc.root(), &Selector::parse(".nav-link.active").unwrap())
            .into_iter()
            .map(|n| doc.element(n).unwrap().attr("href").unwrap().to_string())
            .collect()
    }

    #[test]
    fn marks_exactly_the_matching_link() {
        let (_, nav) = selectors();
        let mut doc = Document::parse(PAGE);

        assert!(mark_active_link(&mut doc, &nav, "/guide/setup"));
        assert_eq!(active(&doc), vec!["/guide/setup"]);

        assert!(!mark_active_link(&mut doc, &nav, "/missing"));
        assert!(active(&doc).is_empty());
    }

    #[test]
    fn href_normalizes_leading_slashes() {
        assert_eq!(nav_href("//guide"), "/guide");
        assert_eq!(nav_href("/"), "/");
        assert_eq!(nav_href(""), "/");
    }

    #[test]
    fn centers_active_link() {
        let (side, nav) = selectors();
        let mut doc = Document::parse(PAGE);
        mark_active_link(&mut doc, &nav, "/guide/setup");
        let sidebar = doc.get_element_by_id("sidebar").unwrap();

        let layout = FixedLayout::new()
            .with("sidebar", Rect::new(60.0, 600.0))
            .with("/guide/setup", Rect::new(1260.0, 24.0));
        let mut window = Window::new(
            doc,
            History::new(url::Url::parse("https://docs.example.com/guide/setup").unwrap()),
            Viewport::default(),
            Arc::new(layout),
        );

        center_active_link(&mut window, &side, &nav);
        assert_eq!(window.element_scroll_top(sidebar), 900.0);
    }

    #[test]
    fn near_top_link_clamps_to_zero() {
        let (side, nav) = selectors();
        let doc = Document::parse(PAGE);
        let sidebar = doc.get_element_by_id("sidebar").unwrap();
        let layout = FixedLayout::new()
            .with("sidebar", Rect::new(60.0, 600.0))
            .with("/", Rect::new(80.0, 24.0));
        let mut window = Window::new(
            doc,
            History::new(url::Url::parse("https://docs.example.com/").unwrap()),
            Viewport::default(),
            Arc::new(layout),
        );

        center_active_link(&mut window, &side, &nav);
        assert_eq!(window.element_scroll_top(sidebar), 0.0);
    }
}
