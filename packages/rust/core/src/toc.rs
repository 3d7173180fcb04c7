//! On-page outline: heading anchors and the table-of-contents list.

use std::collections::HashSet;

use tracing::{debug, instrument};

use docnav_dom::{Document, NodeId, Selector};
use docnav_shared::{HeadingLevel, TocEntry};

use crate::api_cards::{ANCHOR_ATTR, PROCESSED_ATTR};
use crate::selectors::TOC_LINK_CLASS;

/// Fallback anchor for headings whose text has no slug characters.
const EMPTY_SLUG: &str = "section";

/// Lowercase the text and collapse every run of other characters into `-`.
///
/// Leading and trailing dashes are kept, so `"What's new?"` becomes
/// `"what-s-new-"`; links already published against these anchors depend on it.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    slug
}

/// `base`, or `base-2`, `base-3`, … whichever no attached element uses yet.
pub(crate) fn unique_id(doc: &Document, base: &str) -> String {
    let base = if base.is_empty() { EMPTY_SLUG } else { base };
    if doc.get_element_by_id(base).is_none() {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| doc.get_element_by_id(candidate).is_none())
        .unwrap_or_else(|| base.to_string())
}

/// Headings with one of `tags` inside any of the article roots, in document
/// order, each once.
pub(crate) fn article_headings(doc: &Document, articles: &[NodeId], tags: &[&str]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut headings = Vec::new();
    for &article in articles {
        for node in doc.descendants(article) {
            if tags.iter().any(|t| doc.is_tag(node, t)) && seen.insert(node) {
                headings.push(node);
            }
        }
    }
    headings.sort_by_key(|&n| document_position(doc, n));
    headings
}

/// Preorder index path from the root, for ordering nodes.
fn document_position(doc: &Document, node: NodeId) -> Vec<usize> {
    let mut path: Vec<usize> = std::iter::once(node)
        .chain(doc.ancestors(node))
        .filter_map(|n| {
            let parent = doc.parent(n)?;
            doc.children(parent).iter().position(|&c| c == n)
        })
        .collect();
    path.reverse();
    path
}

/// One outline entry and what the scroll spy should watch for it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub entry: TocEntry,
    /// The element whose position marks the section: the heading, or the
    /// API card that replaced it.
    pub target: NodeId,
    /// The generated `a.toc-link`.
    pub link: NodeId,
}

/// Clear the outline list and rebuild it from the article headings.
///
/// Headings without an id get one. Returns an empty outline when the page
/// has no list to fill.
#[instrument(skip_all)]
pub(crate) fn build_outline(
    doc: &mut Document,
    toc_list: &Selector,
    articles: &[NodeId],
    nested_indent_px: u32,
) -> Vec<OutlineItem> {
    let root = doc.root();
    let Some(list) = doc.select_first(root, toc_list) else {
        debug!("page has no outline list");
        return Vec::new();
    };
    doc.clear_children(list);

    let mut items = Vec::new();
    for heading in article_headings(doc, articles, &["h2", "h3"]) {
        let Some(level) = doc.tag_name(heading).and_then(HeadingLevel::from_tag) else {
            continue;
        };
        let label = doc.text_content(heading).trim().to_string();
        let (id, target) = resolve_anchor(doc, heading, &label);

        let li = doc.create_element("li");
        let link = doc.create_element_with_class("a", TOC_LINK_CLASS);
        if let Some(el) = doc.element_mut(link) {
            el.set_attr("href", format!("#{id}"));
            if level == HeadingLevel::H3 {
                el.set_style("padding-left", &format!("{nested_indent_px}px"));
            }
        }
        doc.set_text(link, &label);
        doc.append_child(li, link);
        doc.append_child(list, li);

        items.push(OutlineItem {
            entry: TocEntry { id, label, level },
            target,
            link,
        });
    }

    debug!(entries = items.len(), "outline built");
    items
}

/// The anchor id for a heading and the element it lives on.
fn resolve_anchor(doc: &mut Document, heading: NodeId, label: &str) -> (String, NodeId) {
    let Some(el) = doc.element(heading) else {
        return (String::new(), heading);
    };

    if el.attr(PROCESSED_ATTR) == Some("1") {
        if let Some(anchor) = el.attr(ANCHOR_ATTR).map(str::to_string) {
            let target = doc.get_element_by_id(&anchor).unwrap_or(heading);
            return (anchor, target);
        }
    }
    if let Some(id) = el.id() {
        return (id.to_string(), heading);
    }

    let id = unique_id(doc, &slugify(label));
    if let Some(el) = doc.element_mut(heading) {
        el.set_attr("id", id.as_str());
    }
    (id, heading)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new?"), "what-s-new-");
        assert_eq!(slugify("  API / v2  "), "-api-v2-");
        assert_eq!(slugify("日本語"), "-");
        assert_eq!(slugify(""), "");
    }

    fn setup() -> (Document, Vec<NodeId>, Selector) {
        let doc = Document::parse(
            r##"<html><body>
<aside class="toc"><ul id="toc-list"><li>stale</li></ul></aside>
<main class="main"><div class="md-content">
<h2>Install</h2>
<h3 id="from-source">From source</h3>
<h2>Install</h2>
<h4>Too deep</h4>
<h3>  </h3>
</div></main></body></html>"##,
        );
        let articles = doc.select(doc.root(), &Selector::parse(".md-content").unwrap());
        (doc, articles, Selector::parse("#toc-list").unwrap())
    }

    #[test]
    fn outline_lists_h2_h3_in_order_with_unique_ids() {
        let (mut doc, articles, toc) = setup();
        let items = build_outline(&mut doc, &toc, &articles, 35);

        let ids: Vec<&str> = items.iter().map(|i| i.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["install", "from-source", "install-2", "section"]);
        assert_eq!(items[1].entry.level, HeadingLevel::H3);
        assert!(doc.get_element_by_id("install-2").is_some());

        let list = doc.get_element_by_id("toc-list").unwrap();
        assert_eq!(
            doc.inner_html(list),
            "<li><a class=\"toc-link\" href=\"#install\">Install</a></li>\
<li><a class=\"toc-link\" href=\"#from-source\" style=\"padding-left: 35px\">From source</a></li>\
<li><a class=\"toc-link\" href=\"#install-2\">Install</a></li>\
<li><a class=\"toc-link\" href=\"#section\" style=\"padding-left: 35px\"></a></li>"
        );
    }

    #[test]
    fn rebuilding_replaces_entries() {
        let (mut doc, articles, toc) = setup();
        build_outline(&mut doc, &toc, &articles, 35);
        let first = doc.outer_html(doc.root());

        let items = build_outline(&mut doc, &toc, &articles, 35);
        assert_eq!(items.len(), 4);
        assert_eq!(doc.outer_html(doc.root()), first);
    }

    #[test]
    fn missing_list_yields_empty_outline() {
        let mut doc = Document::parse("<html><body><div class=\"md-content\"><h2>A</h2></div></body></html>");
        let articles = doc.select(doc.root(), &Selector::parse(".md-content").unwrap());
        let toc = Selector::parse("#toc-list").unwrap();
        assert!(build_outline(&mut doc, &toc, &articles, 35).is_empty());
    }
}
