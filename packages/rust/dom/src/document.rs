//! Arena-backed mutable document tree.

use scraper::Html;

use crate::node::{ElementData, Node};
use crate::selector::Selector;
use crate::serialize;

/// Handle to a node inside one [`Document`].
///
/// Handles stay valid for the lifetime of the document, including after the
/// node is detached; a detached node simply stops being reachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed HTML document that can be edited in place.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: Node::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a full HTML document.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::new();
        let root = doc.root();
        doc.copy_parsed(root, &parsed, false);
        doc
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id)?.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.slots.get_mut(id.0)?.node.as_element_mut()
    }

    /// Lowercase tag name of an element node.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::name)
    }

    /// Whether `id` is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|el| el.is(tag))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child nodes that are elements.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// The next sibling that is an element.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&s| self.element(s).is_some())
    }

    /// All descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// Inclusive containment, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// The nearest inclusive ancestor element satisfying `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&ElementData) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    /// Every descendant of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// The first descendant of `scope` matching `selector`.
    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// Attached element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).into_iter().next()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_by_tag(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_by_tag(self.document_element()?, "body")
    }

    fn child_by_tag(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.is_tag(c, tag))
    }

    // -----------------------------------------------------------------------
    // Text and markup
    // -----------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(Node::Text(text)) = self.node(id) {
            out.push_str(text);
        }
        for n in self.descendants(id) {
            if let Some(Node::Text(text)) = self.node(n) {
                out.push_str(text);
            }
        }
        out
    }

    /// Serialized markup of the node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serialize::write_node(self, child, &mut out);
        }
        out
    }

    /// Serialized markup of the node itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(self, id, &mut out);
        out
    }

    /// The document title with whitespace collapsed, like `document.title`.
    pub fn title(&self) -> String {
        let Some(title) = self
            .descendants(self.root())
            .into_iter()
            .find(|&n| self.is_tag(n, "title"))
        else {
            return String::new();
        };
        self.text_content(title)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace the title text, creating `<title>` in `<head>` if needed.
    pub fn set_title(&mut self, title: &str) {
        let existing = self
            .descendants(self.root())
            .into_iter()
            .find(|&n| self.is_tag(n, "title"));
        let target = match existing {
            Some(el) => el,
            None => {
                let Some(head) = self.head() else {
                    return;
                };
                let el = self.create_element("title");
                self.append_child(head, el);
                el
            }
        };
        self.set_text(target, title);
    }

    /// `content` of the first `<meta name="…">`; `Some("")` if the attribute is absent.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        let meta = self.find_meta(name)?;
        Some(
            self.element(meta)
                .and_then(|el| el.attr("content"))
                .unwrap_or("")
                .to_string(),
        )
    }

    /// Set `content` on `<meta name="…">`, appending one to `<head>` if missing.
    pub fn set_meta_content(&mut self, name: &str, content: &str) {
        let meta = match self.find_meta(name) {
            Some(meta) => meta,
            None => {
                let Some(head) = self.head() else {
                    return;
                };
                let meta = self.create_element("meta");
                if let Some(el) = self.element_mut(meta) {
                    el.set_attr("name", name);
                }
                self.append_child(head, meta);
                meta
            }
        };
        if let Some(el) = self.element_mut(meta) {
            el.set_attr("content", content);
        }
    }

    fn find_meta(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root()).into_iter().find(|&n| {
            self.element(n)
                .is_some_and(|el| el.is("meta") && el.attr("name") == Some(name))
        })
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::Element(ElementData::new(tag)))
    }

    /// Create a detached element with a class attribute.
    pub fn create_element_with_class(&mut self, tag: &str, class: &str) -> NodeId {
        let mut data = ElementData::new(tag);
        data.set_attr("class", class);
        self.alloc(Node::Element(data))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::Text(text.to_string()))
    }

    /// Remove a node from its parent. The node and its subtree stay addressable.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.slots[parent.0].children.retain(|&c| c != id);
        self.slots[id.0].parent = None;
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        self.slots[parent.0].children.push(child);
        self.slots[child.0].parent = Some(parent);
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        self.slots[parent.0].children.insert(0, child);
        self.slots[child.0].parent = Some(parent);
    }

    /// Move `new` directly before `reference`. No-op if `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if new == reference || self.contains(new, parent) {
            return;
        }
        self.detach(new);
        let pos = self.slots[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(0);
        self.slots[parent.0].children.insert(pos, new);
        self.slots[new.0].parent = Some(parent);
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.slots[id.0].children);
        for child in children {
            self.slots[child.0].parent = None;
        }
    }

    /// Replace the children with a single text node, like `textContent = …`.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    /// Replace the children with parsed markup, like `innerHTML = …`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        let parsed = Html::parse_fragment(html);
        self.copy_parsed(id, &parsed, true);
    }

    /// Deep-copy a subtree of another document into this one, detached.
    pub fn import_subtree(&mut self, src: &Document, src_id: NodeId) -> NodeId {
        let Some(node) = src.node(src_id) else {
            return self.create_text("");
        };
        let top = self.alloc(node.clone());
        let mut stack: Vec<(NodeId, NodeId)> = src
            .children(src_id)
            .iter()
            .rev()
            .map(|&c| (top, c))
            .collect();
        while let Some((parent, src_child)) = stack.pop() {
            let Some(node) = src.node(src_child) else {
                continue;
            };
            let copy = self.alloc(node.clone());
            self.slots[parent.0].children.push(copy);
            self.slots[copy.0].parent = Some(parent);
            stack.extend(src.children(src_child).iter().rev().map(|&c| (copy, c)));
        }
        top
    }

    /// Replace the children of `dest` with copies of `src_parent`'s children.
    pub fn replace_children_from(&mut self, dest: NodeId, src: &Document, src_parent: NodeId) {
        self.clear_children(dest);
        for &child in src.children(src_parent) {
            let copy = self.import_subtree(src, child);
            self.append_child(dest, copy);
        }
    }

    /// Copy nodes from a scraper tree under `dest`.
    ///
    /// Fragments parsed by scraper are wrapped in a synthetic `<html>` element;
    /// `unwrap_root` copies that wrapper's children instead of the wrapper.
    fn copy_parsed(&mut self, dest: NodeId, parsed: &Html, unwrap_root: bool) {
        let mut starts = Vec::new();
        for child in parsed.tree.root().children() {
            let is_wrapper =
                unwrap_root && child.value().as_element().is_some_and(|el| el.name() == "html");
            if is_wrapper {
                starts.extend(child.children());
            } else {
                starts.push(child);
            }
        }

        let mut stack: Vec<_> = starts.into_iter().rev().map(|n| (dest, n)).collect();
        while let Some((parent, src)) = stack.pop() {
            let node = match src.value() {
                scraper::Node::Element(el) => {
                    let mut data = ElementData::new(el.name());
                    for (name, value) in el.attrs() {
                        data.set_attr(name, value);
                    }
                    Node::Element(data)
                }
                scraper::Node::Text(text) => {
                    let text: &str = text;
                    Node::Text(text.to_owned())
                }
                scraper::Node::Comment(comment) => {
                    let comment: &str = comment;
                    Node::Comment(comment.to_owned())
                }
                _ => continue,
            };
            let is_element = matches!(node, Node::Element(_));
            let id = self.alloc(node);
            self.slots[parent.0].children.push(id);
            self.slots[id.0].parent = Some(parent);
            if is_element {
                let children: Vec<_> = src.children().collect();
                stack.extend(children.into_iter().rev().map(|c| (id, c)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head><title> Guide </title><meta name="description" content="Intro"></head>
<body><main class="main"><div class="md-content"><h2 id="a">A</h2><p>one <b>two</b></p></div></main></body></html>"#;

    #[test]
    fn parse_builds_expected_structure() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.title(), "Guide");
        assert_eq!(doc.meta_content("description").as_deref(), Some("Intro"));

        let h2 = doc.get_element_by_id("a").expect("heading");
        assert_eq!(doc.tag_name(h2), Some("h2"));
        let p = doc.next_element_sibling(h2).expect("paragraph");
        assert_eq!(doc.text_content(p), "one two");
        assert_eq!(doc.inner_html(p), "one <b>two</b>");
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut doc = Document::parse(PAGE);
        let h2 = doc.get_element_by_id("a").unwrap();
        doc.set_inner_html(h2, "<span class=\"x\">New</span> tail");
        assert_eq!(doc.inner_html(h2), "<span class=\"x\">New</span> tail");
        assert_eq!(doc.text_content(h2), "New tail");
    }

    #[test]
    fn detached_nodes_are_not_found_by_id() {
        let mut doc = Document::parse(PAGE);
        let h2 = doc.get_element_by_id("a").unwrap();
        doc.detach(h2);
        assert!(!doc.is_attached(h2));
        assert!(doc.get_element_by_id("a").is_none());
        assert_eq!(doc.tag_name(h2), Some("h2"));
    }

    #[test]
    fn insert_before_and_replace_with() {
        let mut doc = Document::parse(PAGE);
        let h2 = doc.get_element_by_id("a").unwrap();
        let parent = doc.parent(h2).unwrap();

        let note = doc.create_element("aside");
        doc.insert_before(h2, note);
        assert_eq!(doc.element_children(parent)[0], note);

        let details = doc.create_element("details");
        doc.replace_with(h2, details);
        assert_eq!(doc.element_children(parent), vec![note, details, doc.element_children(parent)[2]]);
        assert!(!doc.is_attached(h2));
    }

    #[test]
    fn append_child_refuses_cycles() {
        let mut doc = Document::parse(PAGE);
        let body = doc.body().unwrap();
        let html = doc.document_element().unwrap();
        doc.append_child(body, html);
        assert_eq!(doc.parent(body), Some(html));
        assert!(doc.is_attached(body));
    }

    #[test]
    fn replace_children_from_copies_between_documents() {
        let mut live = Document::parse(PAGE);
        let incoming = Document::parse(
            "<html><body><main class=\"main\"><h2 id=\"b\">B</h2></main></body></html>",
        );
        let live_main = live.body().map(|b| live.element_children(b)[0]).unwrap();
        let src_main = incoming.body().map(|b| incoming.element_children(b)[0]).unwrap();

        live.replace_children_from(live_main, &incoming, src_main);
        assert_eq!(live.inner_html(live_main), "<h2 id=\"b\">B</h2>");
        assert!(live.get_element_by_id("a").is_none());
        assert!(live.get_element_by_id("b").is_some());
    }

    #[test]
    fn meta_and_title_are_created_when_missing() {
        let mut doc = Document::parse("<html><head></head><body></body></html>");
        doc.set_title("Setup");
        doc.set_meta_content("description", "How to set up");
        assert_eq!(doc.title(), "Setup");
        assert_eq!(doc.meta_content("description").as_deref(), Some("How to set up"));
    }
}
