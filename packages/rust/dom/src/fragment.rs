//! Parsed result of a soft-navigation fetch.

use docnav_shared::{DocNavError, Result};
use tracing::debug;

use crate::document::{Document, NodeId};
use crate::selector::Selector;

/// The parts of a fetched page that get merged into the live page.
///
/// Constructed once per navigation and dropped after the merge.
#[derive(Debug, Clone)]
pub struct PageFragment {
    document: Document,
    content: NodeId,
    title: String,
    description: Option<String>,
}

impl PageFragment {
    /// Parse a fetched HTML page and locate its content region.
    ///
    /// A page without a matching content region is a structural failure.
    pub fn parse(html: &str, content_region: &Selector) -> Result<Self> {
        let document = Document::parse(html);
        let content = document
            .select_first(document.root(), content_region)
            .ok_or_else(|| {
                DocNavError::structural(format!(
                    "fetched page has no element matching {content_region}"
                ))
            })?;
        let title = document.title();
        let description = document.meta_content("description");

        debug!(%title, has_description = description.is_some(), "parsed page fragment");

        Ok(Self {
            document,
            content,
            title,
            description,
        })
    }

    /// The parsed source document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The content region inside [`Self::document`].
    pub fn content(&self) -> NodeId {
        self.content
    }

    /// Title text; empty when the page has none.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `content` of `<meta name="description">`, if present.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_description_and_region() {
        let sel = Selector::parse("main.main").unwrap();
        let fragment = PageFragment::parse(
            r#"<html><head><title>Setup</title><meta name="description" content="Install it"></head>
<body><main class="main"><h1>Setup</h1></main></body></html>"#,
            &sel,
        )
        .unwrap();

        assert_eq!(fragment.title(), "Setup");
        assert_eq!(fragment.description(), Some("Install it"));
        assert_eq!(
            fragment.document().inner_html(fragment.content()),
            "<h1>Setup</h1>"
        );
    }

    #[test]
    fn missing_region_is_structural() {
        let sel = Selector::parse("main.main").unwrap();
        let err = PageFragment::parse("<html><body><p>404</p></body></html>", &sel).unwrap_err();
        assert!(matches!(err, DocNavError::Structural { .. }));
    }
}
