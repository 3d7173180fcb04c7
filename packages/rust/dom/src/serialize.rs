//! HTML serialization for [`Document`] subtrees.

use crate::document::{Document, NodeId};
use crate::node::Node;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Escape text content for HTML output.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.node(id) {
        Some(Node::Document) => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        Some(Node::Element(el)) => {
            out.push('<');
            out.push_str(el.name());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&el.name()) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&el.name());
            for &child in doc.children(id) {
                match doc.node(child) {
                    Some(Node::Text(text)) if raw => out.push_str(text),
                    _ => write_node(doc, child, out),
                }
            }

            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        Some(Node::Text(text)) => out.push_str(&escape_text(text)),
        Some(Node::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc.create_element("a");
        doc.element_mut(el).unwrap().set_attr("title", "say \"hi\" & go");
        let text = doc.create_text("1 < 2 & 3 > 2");
        doc.append_child(el, text);
        doc.append_child(root, el);

        assert_eq!(
            doc.outer_html(el),
            "<a title=\"say &quot;hi&quot; &amp; go\">1 &lt; 2 &amp; 3 &gt; 2</a>"
        );
    }

    #[test]
    fn void_and_raw_text_elements() {
        let doc = Document::parse(
            "<html><head><script>if (a < b) {}</script></head><body><p>x<br>y</p></body></html>",
        );
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.inner_html(head), "<script>if (a < b) {}</script>");
        assert_eq!(doc.inner_html(body), "<p>x<br>y</p>");
    }
}
