//! API reference cards.
//!
//! Docs write API entries as an `h3` followed by a bullet list of
//! `**Label:** value` items. Each such pair becomes a collapsible
//! `details.api-card`; the heading stays in the document, hidden, so the
//! outline still lists it.

use tracing::debug;

use docnav_dom::{Document, NodeId};
use docnav_shared::{ApiCard, ApiRow};

use crate::toc::{article_headings, slugify, unique_id};

/// Set to `"1"` on headings that already have a card.
pub const PROCESSED_ATTR: &str = "data-api-processed";

/// On a processed heading, the id of its card.
pub const ANCHOR_ATTR: &str = "data-api-anchor";

/// Label that promotes a row to the signature block.
const SIGNATURE_LABEL: &str = "signature";

/// Replace every unprocessed `h3` + list pair in the articles with a card.
pub(crate) fn build_api_cards(doc: &mut Document, articles: &[NodeId]) -> Vec<ApiCard> {
    let mut cards = Vec::new();

    for heading in article_headings(doc, articles, &["h3"]) {
        let Some(el) = doc.element(heading) else {
            continue;
        };
        if el.attr(PROCESSED_ATTR) == Some("1") {
            continue;
        }
        let existing_id = el.id().map(str::to_string);

        let Some(list) = doc.next_element_sibling(heading) else {
            continue;
        };
        if !doc.is_tag(list, "ul") {
            continue;
        }
        let items: Vec<NodeId> = doc
            .element_children(list)
            .into_iter()
            .filter(|&c| doc.is_tag(c, "li"))
            .collect();
        if items.is_empty() {
            continue;
        }

        let title = doc.text_content(heading).trim().to_string();
        let anchor = existing_id.unwrap_or_else(|| unique_id(doc, &slugify(&title)));

        let card = extract_card(doc, title, anchor, &items);
        let details = render_card(doc, &card);
        doc.replace_with(list, details);

        if let Some(el) = doc.element_mut(heading) {
            el.remove_attr("id");
            el.set_attr(ANCHOR_ATTR, card.anchor.as_str());
            el.set_style("display", "none");
            el.set_attr(PROCESSED_ATTR, "1");
        }
        // The card takes the heading's id once the heading no longer holds it.
        if let Some(el) = doc.element_mut(details) {
            el.set_attr("id", card.anchor.as_str());
        }

        debug!(anchor = %card.anchor, rows = card.rows.len(), "api card built");
        cards.push(card);
    }

    cards
}

/// Read the rows out of the list items. Label elements are removed from the
/// items as they are read; the list is discarded afterwards.
fn extract_card(doc: &mut Document, title: String, anchor: String, items: &[NodeId]) -> ApiCard {
    let mut signature = None;
    let mut rows = Vec::new();

    for &li in items {
        let label_node = doc
            .descendants(li)
            .into_iter()
            .find(|&n| doc.is_tag(n, "strong") || doc.is_tag(n, "b"));
        let Some(label_node) = label_node else {
            rows.push(ApiRow::FullWidth {
                value_html: doc.inner_html(li).trim().to_string(),
            });
            continue;
        };

        let label = doc
            .text_content(label_node)
            .replacen(':', "", 1)
            .trim()
            .to_string();
        doc.detach(label_node);
        let value_html = doc.inner_html(li).trim().to_string();

        if label.eq_ignore_ascii_case(SIGNATURE_LABEL) && signature.is_none() {
            signature = Some(value_html);
        } else {
            rows.push(ApiRow::Property { label, value_html });
        }
    }

    ApiCard {
        title,
        anchor,
        signature,
        rows,
    }
}

fn render_card(doc: &mut Document, card: &ApiCard) -> NodeId {
    let details = doc.create_element_with_class("details", "api-card");
    if let Some(el) = doc.element_mut(details) {
        el.set_attr("open", "");
    }

    let summary = doc.create_element("summary");
    doc.set_text(summary, &card.title);
    doc.append_child(details, summary);

    let content = doc.create_element_with_class("div", "api-content");
    doc.append_child(details, content);

    if let Some(signature) = &card.signature {
        let sig_box = doc.create_element_with_class("div", "api-signature-box");
        doc.set_inner_html(
            sig_box,
            &format!("<span class=\"api-signature-label\">func</span> <span>{signature}</span>"),
        );
        doc.append_child(content, sig_box);
    }

    let props = doc.create_element_with_class("div", "api-prop-list");
    doc.append_child(content, props);

    for row in &card.rows {
        let row_el = doc.create_element_with_class("div", "api-prop-row");
        match row {
            ApiRow::Property { label, value_html } => {
                let label_el = doc.create_element_with_class("div", "api-prop-label");
                doc.set_text(label_el, label);
                let value_el = doc.create_element_with_class("div", "api-prop-value");
                doc.set_inner_html(value_el, value_html);
                doc.append_child(row_el, label_el);
                doc.append_child(row_el, value_el);
            }
            ApiRow::FullWidth { value_html } => {
                let value_el = doc.create_element_with_class("div", "api-prop-value");
                if let Some(el) = doc.element_mut(value_el) {
                    el.set_attr("style", "grid-column: 1 / -1");
                }
                doc.set_inner_html(value_el, value_html);
                doc.append_child(row_el, value_el);
            }
        }
        doc.append_child(props, row_el);
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use docnav_dom::Selector;

    const PAGE: &str = r#"<html><body><main class="main"><div class="md-content">
<h3 id="fetch-page">fetch_page</h3>
<ul>
<li><strong>Signature:</strong> <code>fetch_page(url)</code></li>
<li><strong>Returns:</strong> the <em>body</em></li>
<li>Raises on timeout</li>
</ul>
<h3>Not an API</h3>
<p>Just prose.</p>
<h3>Load Config</h3>
<ul><li><b>Path:</b> file</li></ul>
</div></main></body></html>"#;

    fn articles(doc: &Document) -> Vec<NodeId> {
        doc.select(doc.root(), &Selector::parse(".md-content").unwrap())
    }

    #[test]
    fn builds_cards_from_heading_list_pairs() {
        let mut doc = Document::parse(PAGE);
        let scopes = articles(&doc);
        let cards = build_api_cards(&mut doc, &scopes);

        assert_eq!(cards.len(), 2);
        let first = &cards[0];
        assert_eq!(first.title, "fetch_page");
        assert_eq!(first.anchor, "fetch-page");
        assert_eq!(first.signature.as_deref(), Some("<code>fetch_page(url)</code>"));
        assert_eq!(
            first.rows,
            vec![
                ApiRow::Property {
                    label: "Returns".into(),
                    value_html: "the <em>body</em>".into(),
                },
                ApiRow::FullWidth {
                    value_html: "Raises on timeout".into(),
                },
            ]
        );
        assert_eq!(cards[1].anchor, "load-config");
    }

    #[test]
    fn card_markup_and_hidden_heading() {
        let mut doc = Document::parse(PAGE);
        let scopes = articles(&doc);
        build_api_cards(&mut doc, &scopes);

        let card = doc.get_element_by_id("fetch-page").unwrap();
        assert!(doc.is_tag(card, "details"));
        assert_eq!(
            doc.outer_html(card),
            "<details class=\"api-card\" open=\"\" id=\"fetch-page\">\
<summary>fetch_page</summary>\
<div class=\"api-content\">\
<div class=\"api-signature-box\"><span class=\"api-signature-label\">func</span> <span><code>fetch_page(url)</code></span></div>\
<div class=\"api-prop-list\">\
<div class=\"api-prop-row\"><div class=\"api-prop-label\">Returns</div><div class=\"api-prop-value\">the <em>body</em></div></div>\
<div class=\"api-prop-row\"><div class=\"api-prop-value\" style=\"grid-column: 1 / -1\">Raises on timeout</div></div>\
</div></div></details>"
        );

        let heading = doc
            .select(doc.root(), &Selector::parse("h3[data-api-anchor=\"fetch-page\"]").unwrap())[0];
        let el = doc.element(heading).unwrap();
        assert_eq!(el.style("display").as_deref(), Some("none"));
        assert_eq!(el.attr(PROCESSED_ATTR), Some("1"));
        assert_eq!(el.id(), None);
        assert!(!doc.outer_html(doc.root()).contains("<ul>"));
    }

    #[test]
    fn processed_headings_are_skipped() {
        let mut doc = Document::parse(PAGE);
        let scopes = articles(&doc);
        build_api_cards(&mut doc, &scopes);
        let before = doc.outer_html(doc.root());

        assert!(build_api_cards(&mut doc, &scopes).is_empty());
        assert_eq!(doc.outer_html(doc.root()), before);
    }
}
