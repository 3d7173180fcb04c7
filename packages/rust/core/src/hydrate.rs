//! Per-page hydration: everything that has to be redone whenever the content
//! region is new.
//!
//! Steps run in a fixed order: code blocks, API cards, outline (with a fresh
//! scroll spy), icons, sidebar scroll. Each step skips what it already did, so
//! running the pipeline twice over the same content changes nothing.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use docnav_shared::{ApiCard, HydrationConfig, TocEntry};

use crate::api_cards::build_api_cards;
use crate::code_blocks::{self, CodeBlockReport};
use crate::highlight::Highlighter;
use crate::icons::render_icons;
use crate::scroll_spy::ScrollSpy;
use crate::selectors::Selectors;
use crate::sidebar::center_active_link;
use crate::toc::build_outline;
use crate::window::Window;

/// What one hydration pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationReport {
    pub code: CodeBlockReport,
    pub api_cards: Vec<ApiCard>,
    pub outline: Vec<TocEntry>,
    pub icons: usize,
    /// Outline entry highlighted after the pass.
    pub active_entry: Option<String>,
}

/// Runs hydration and owns the page's scroll spy.
pub struct HydrationPipeline {
    selectors: Arc<Selectors>,
    config: HydrationConfig,
    highlighter: Option<Arc<dyn Highlighter>>,
    spy: Option<ScrollSpy>,
}

impl std::fmt::Debug for HydrationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationPipeline")
            .field("config", &self.config)
            .field("highlighter", &self.highlighter.is_some())
            .field("spy", &self.spy)
            .finish_non_exhaustive()
    }
}

impl HydrationPipeline {
    pub fn new(
        selectors: Arc<Selectors>,
        config: HydrationConfig,
        highlighter: Option<Arc<dyn Highlighter>>,
    ) -> Self {
        let highlighter = highlighter.filter(|_| config.highlight);
        Self {
            selectors,
            config,
            highlighter,
            spy: None,
        }
    }

    pub fn scroll_spy(&self) -> Option<&ScrollSpy> {
        self.spy.as_ref()
    }

    /// Hydrate the current content region.
    #[instrument(skip_all, fields(url = %window.location()))]
    pub fn run(&mut self, window: &mut Window) -> HydrationReport {
        let mut report = HydrationReport::default();
        let selectors = Arc::clone(&self.selectors);

        {
            let doc = window.document_mut();
            let root = doc.root();

            match doc.select_first(root, &selectors.content_region) {
                Some(content) => {
                    report.code = code_blocks::enhance(
                        doc,
                        content,
                        &selectors.hint,
                        self.highlighter.as_deref(),
                    );
                }
                None => warn!(selector = %selectors.content_region, "no content region to hydrate"),
            }

            let articles = doc.select(root, &selectors.article);
            report.api_cards = build_api_cards(doc, &articles);

            if let Some(old) = self.spy.take() {
                old.disconnect();
            }
            let items = build_outline(
                doc,
                &selectors.toc_list,
                &articles,
                self.config.nested_indent_px,
            );
            let container = doc.select_first(root, &selectors.toc_container);
            report.outline = items.iter().map(|item| item.entry.clone()).collect();
            self.spy = Some(ScrollSpy::observe(&items, container));

            report.icons = render_icons(doc);
        }

        report.active_entry = self.on_scroll(window);
        center_active_link(window, &selectors.sidebar, &selectors.nav_link);

        debug!(
            api_cards = report.api_cards.len(),
            outline = report.outline.len(),
            icons = report.icons,
            "page hydrated"
        );
        report
    }

    /// Let the scroll spy react to the current scroll offset.
    pub fn on_scroll(&mut self, window: &mut Window) -> Option<String> {
        self.spy
            .as_mut()
            .and_then(|spy| spy.evaluate(window).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FixedLayout, Rect};
    use crate::highlight::PlainHighlighter;
    use crate::window::{History, Viewport};
    use docnav_dom::Document;
    use docnav_shared::SelectorConfig;

    const PAGE: &str = r#"<html><body>
<nav id="sidebar"><a class="nav-link active" href="/guide">Guide</a></nav>
<main class="main">
<article class="md-content">
<h2>Overview</h2>
<pre><code class="language-rust">fn main() {}</code></pre>
<h3>connect</h3>
<ul><li><strong>Returns:</strong> a handle</li></ul>
<h2>Usage</h2>
<p><i data-lucide="info"></i> note</p>
</article>
</main>
<aside class="toc"><ul id="toc-list"></ul></aside>
</body></html>"#;

    fn window(layout: FixedLayout) -> Window {
        Window::new(
            Document::parse(PAGE),
            History::new(url::Url::parse("https://docs.example.com/guide").unwrap()),
            Viewport::new(1280, 1000),
            Arc::new(layout),
        )
    }

    fn pipeline() -> HydrationPipeline {
        HydrationPipeline::new(
            Arc::new(Selectors::from_config(&SelectorConfig::default()).unwrap()),
            HydrationConfig::default(),
            Some(Arc::new(PlainHighlighter)),
        )
    }

    #[test]
    fn full_pass_reports_every_step() {
        let mut window = window(
            FixedLayout::new()
                .with("overview", Rect::new(120.0, 30.0))
                .with("connect", Rect::new(200.0, 80.0))
                .with("usage", Rect::new(900.0, 30.0)),
        );
        let report = pipeline().run(&mut window);

        assert_eq!(report.code.headers, 1);
        assert_eq!(report.code.copy_buttons, 1);
        assert_eq!(report.api_cards.len(), 1);
        assert_eq!(report.icons, 1);

        let ids: Vec<&str> = report.outline.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["overview", "connect", "usage"]);
        // The card for "connect" is what the spy watches.
        assert_eq!(report.active_entry.as_deref(), Some("connect"));
    }

    #[test]
    fn second_run_is_idempotent() {
        let mut window = window(FixedLayout::new());
        let mut pipeline = pipeline();

        pipeline.run(&mut window);
        let first = window.document().outer_html(window.document().root());

        let report = pipeline.run(&mut window);
        let second = window.document().outer_html(window.document().root());

        assert_eq!(first, second);
        assert_eq!(report.code, CodeBlockReport::default());
        assert!(report.api_cards.is_empty());
        assert_eq!(report.icons, 0);
        assert_eq!(report.outline.len(), 3);
        assert_eq!(pipeline.scroll_spy().unwrap().watched(), 3);
    }
}
