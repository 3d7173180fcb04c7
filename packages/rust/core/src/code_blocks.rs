//! Code block enhancement: highlighting, language headers, copy buttons.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, warn};

use docnav_dom::{Document, NodeId, Selector};
use docnav_shared::HydrationConfig;

use crate::clipboard::Clipboard;
use crate::highlight::Highlighter;
use crate::selectors::{CODE_HEADER_CLASS, COPY_BUTTON_CLASS};
use crate::window::Window;

/// Marker left on highlighted `<code>` elements.
pub const HIGHLIGHTED_ATTR: &str = "data-highlighted";

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const FAILED_LABEL: &str = "Failed";

/// Class added to a copy button while it shows success.
pub const COPIED_CLASS: &str = "copied";

/// Counts of what one enhancement pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeBlockReport {
    pub highlighted: usize,
    pub headers: usize,
    pub copy_buttons: usize,
}

/// The language named by a `language-xxx` class.
pub fn code_language(class: &str) -> Option<&str> {
    static LANGUAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"language-(\w+)").expect("valid regex"));
    LANGUAGE_RE
        .captures(class)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Enhance every `<pre>` under `scope`.
///
/// Blocks inside a hint are highlighted but get no chrome. Every step checks
/// for its own output first, so repeated passes change nothing.
pub(crate) fn enhance(
    doc: &mut Document,
    scope: NodeId,
    hint: &Selector,
    highlighter: Option<&dyn Highlighter>,
) -> CodeBlockReport {
    let mut report = CodeBlockReport::default();
    let blocks: Vec<NodeId> = doc
        .descendants(scope)
        .into_iter()
        .filter(|&n| doc.is_tag(n, "pre"))
        .collect();

    for pre in blocks {
        let code = doc
            .element_children(pre)
            .into_iter()
            .find(|&c| doc.is_tag(c, "code"));

        if let (Some(code), Some(highlighter)) = (code, highlighter) {
            if highlight_block(doc, code, highlighter) {
                report.highlighted += 1;
            }
        }

        let in_hint = std::iter::once(pre)
            .chain(doc.ancestors(pre))
            .any(|n| hint.matches(doc, n));
        if in_hint {
            continue;
        }

        if let Some(code) = code {
            if add_language_header(doc, pre, code) {
                report.headers += 1;
            }
        }
        if add_copy_button(doc, pre) {
            report.copy_buttons += 1;
        }
    }

    debug!(
        highlighted = report.highlighted,
        headers = report.headers,
        copy_buttons = report.copy_buttons,
        "code blocks enhanced"
    );
    report
}

fn highlight_block(doc: &mut Document, code: NodeId, highlighter: &dyn Highlighter) -> bool {
    let Some(el) = doc.element(code) else {
        return false;
    };
    if el.attr(HIGHLIGHTED_ATTR) == Some("yes") {
        return false;
    }
    // No language detection: unlabelled blocks stay plain.
    let Some(language) = el.attr("class").and_then(code_language).map(str::to_string) else {
        return false;
    };

    let source = doc.text_content(code);
    let Some(markup) = highlighter.highlight(&source, &language) else {
        return false;
    };
    doc.set_inner_html(code, &markup);
    if let Some(el) = doc.element_mut(code) {
        el.add_class("hljs");
        el.set_attr(HIGHLIGHTED_ATTR, "yes");
    }
    true
}

fn has_direct_child_with_class(doc: &Document, parent: NodeId, class: &str) -> bool {
    doc.element_children(parent)
        .into_iter()
        .any(|c| doc.element(c).is_some_and(|el| el.has_class(class)))
}

fn add_language_header(doc: &mut Document, pre: NodeId, code: NodeId) -> bool {
    let Some(language) = doc
        .element(code)
        .and_then(|el| el.attr("class"))
        .and_then(code_language)
        .map(str::to_string)
    else {
        return false;
    };
    if has_direct_child_with_class(doc, pre, CODE_HEADER_CLASS) {
        return false;
    }

    let header = doc.create_element_with_class("div", CODE_HEADER_CLASS);
    let label = doc.create_element_with_class("span", "code-lang");
    doc.set_text(label, &language);
    doc.append_child(header, label);
    doc.insert_before(code, header);
    true
}

fn add_copy_button(doc: &mut Document, pre: NodeId) -> bool {
    if has_direct_child_with_class(doc, pre, COPY_BUTTON_CLASS) {
        return false;
    }
    let button = doc.create_element_with_class("button", COPY_BUTTON_CLASS);
    doc.set_text(button, COPY_LABEL);
    doc.append_child(pre, button);
    true
}

/// Whether `node` is a copy button injected into a code block.
pub(crate) fn is_copy_button(doc: &Document, node: NodeId) -> bool {
    doc.element(node)
        .is_some_and(|el| el.is("button") && el.has_class(COPY_BUTTON_CLASS))
        && doc.parent(node).is_some_and(|p| doc.is_tag(p, "pre"))
}

/// The text a copy button puts on the clipboard.
///
/// The block's `<code>` text if there is one, otherwise the `<pre>` text
/// without the injected header and button.
pub fn copy_text(doc: &Document, pre: NodeId) -> String {
    if let Some(code) = doc
        .descendants(pre)
        .into_iter()
        .find(|&n| doc.is_tag(n, "code"))
    {
        return doc.text_content(code);
    }

    doc.children(pre)
        .iter()
        .filter(|&&c| {
            !doc.element(c).is_some_and(|el| {
                el.has_class(CODE_HEADER_CLASS) || el.has_class(COPY_BUTTON_CLASS)
            })
        })
        .map(|&c| doc.text_content(c))
        .collect()
}

// ---------------------------------------------------------------------------
// Copy feedback
// ---------------------------------------------------------------------------

/// Result of pressing a copy button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied { text: String },
    Failed { reason: String },
}

/// Copy the block's text and show feedback on the button.
///
/// The label reverts to "Copy" after the configured delay, on a spawned task,
/// as long as the button is still in the document.
pub(crate) fn press_copy_button(
    window: &Arc<Mutex<Window>>,
    clipboard: &dyn Clipboard,
    button: NodeId,
    timings: &HydrationConfig,
) -> CopyOutcome {
    let text = {
        let window = window.lock();
        let doc = window.document();
        match doc.parent(button) {
            Some(pre) => copy_text(doc, pre),
            None => String::new(),
        }
    };

    let (outcome, label, delay) = match clipboard.write_text(&text) {
        Ok(()) => (
            CopyOutcome::Copied { text },
            COPIED_LABEL,
            timings.copy_success_ms,
        ),
        Err(e) => {
            warn!(error = %e, "clipboard write failed");
            (
                CopyOutcome::Failed {
                    reason: e.to_string(),
                },
                FAILED_LABEL,
                timings.copy_failure_ms,
            )
        }
    };
    let copied = matches!(outcome, CopyOutcome::Copied { .. });

    {
        let mut window = window.lock();
        let doc = window.document_mut();
        doc.set_text(button, label);
        if copied {
            if let Some(el) = doc.element_mut(button) {
                el.add_class(COPIED_CLASS);
            }
        }
    }

    let window = Arc::clone(window);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let mut window = window.lock();
        let doc = window.document_mut();
        if !doc.is_attached(button) {
            return;
        }
        doc.set_text(button, COPY_LABEL);
        if copied {
            if let Some(el) = doc.element_mut(button) {
                el.remove_class(COPIED_CLASS);
            }
        }
    });

    outcome
}
