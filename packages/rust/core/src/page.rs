//! One loaded document and the state that lives exactly as long as it does.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use url::Url;

use docnav_dom::{NodeId, PageFragment, Selector};
use docnav_shared::{AppConfig, DocNavError, Result};

use crate::clipboard::Clipboard;
use crate::code_blocks::{self, CopyOutcome};
use crate::events::{EventBus, PageEvent, Pointer};
use crate::hydrate::{HydrationPipeline, HydrationReport};
use crate::navigation::{HistoryMode, LinkDecision, decide_link};
use crate::selectors::Selectors;
use crate::shell::Shell;
use crate::sidebar::mark_active_link;
use crate::window::{History, Window};

/// A document load: window, hydration state, and the once-wired shell.
///
/// Lock order is hydration before window; nothing takes them the other way.
pub struct Page {
    window: Arc<Mutex<Window>>,
    hydration: Mutex<HydrationPipeline>,
    last_report: Mutex<HydrationReport>,
    shell: Shell,
    selectors: Arc<Selectors>,
    config: Arc<AppConfig>,
    events: EventBus,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("window", &*self.window.lock())
            .field("shell", &self.shell)
            .finish_non_exhaustive()
    }
}

impl Page {
    pub(crate) fn new(
        window: Window,
        hydration: HydrationPipeline,
        shell: Shell,
        selectors: Arc<Selectors>,
        config: Arc<AppConfig>,
        events: EventBus,
    ) -> Self {
        Self {
            window: Arc::new(Mutex::new(window)),
            hydration: Mutex::new(hydration),
            last_report: Mutex::new(HydrationReport::default()),
            shell,
            selectors,
            config,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Run `f` with the window locked.
    pub fn with_window<R>(&self, f: impl FnOnce(&Window) -> R) -> R {
        f(&self.window.lock())
    }

    pub fn location(&self) -> Url {
        self.window.lock().location().clone()
    }

    pub fn title(&self) -> String {
        self.window.lock().document().title()
    }

    /// First element matching `selector`.
    pub fn query(&self, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        let window = self.window.lock();
        let doc = window.document();
        Ok(doc.select_first(doc.root(), &selector))
    }

    /// Serialized markup of the content region.
    pub fn content_html(&self) -> Option<String> {
        let window = self.window.lock();
        let doc = window.document();
        doc.select_first(doc.root(), &self.selectors.content_region)
            .map(|main| doc.inner_html(main))
    }

    pub fn html(&self) -> String {
        let window = self.window.lock();
        window.document().outer_html(window.document().root())
    }

    pub fn history(&self) -> History {
        self.window.lock().history().clone()
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Outline entry the scroll spy currently highlights.
    pub fn active_outline_entry(&self) -> Option<String> {
        self.hydration
            .lock()
            .scroll_spy()
            .and_then(|spy| spy.active().map(str::to_string))
    }

    /// Whether the loading indicator is showing.
    pub fn is_loading(&self) -> bool {
        let window = self.window.lock();
        let doc = window.document();
        doc.document_element()
            .and_then(|html| doc.element(html))
            .is_some_and(|el| el.has_class(&self.config.navigation.loading_class))
    }

    pub fn pending_hard_navigation(&self) -> Option<Url> {
        self.window.lock().pending_hard_navigation().cloned()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Wire the shell if this is the first run, then hydrate the content.
    pub fn hydrate(&self) -> HydrationReport {
        let mut pipeline = self.hydration.lock();
        let mut window = self.window.lock();
        self.shell.init_once(&mut window);
        let report = pipeline.run(&mut window);
        *self.last_report.lock() = report.clone();
        report
    }

    /// Report of the most recent hydration pass.
    pub fn last_report(&self) -> HydrationReport {
        self.last_report.lock().clone()
    }

    pub(crate) fn emit(&self, event: PageEvent) {
        self.events.emit(event);
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        let mut window = self.window.lock();
        let doc = window.document_mut();
        let root = doc.root();
        if let Some(el) = doc.document_element().and_then(|html| doc.element_mut(html)) {
            if loading {
                el.add_class(&self.config.navigation.loading_class);
            } else {
                el.remove_class(&self.config.navigation.loading_class);
            }
        }
        if let Some(main) = doc.select_first(root, &self.selectors.content_region) {
            if let Some(el) = doc.element_mut(main) {
                el.set_attr("aria-busy", if loading { "true" } else { "false" });
            }
        }
    }

    pub(crate) fn request_hard_navigation(&self, url: Url) {
        self.window.lock().assign(url);
    }

    pub(crate) fn take_hard_navigation(&self) -> Option<Url> {
        self.window.lock().take_hard_navigation()
    }

    /// Move the history cursor back and return the entry to show.
    pub(crate) fn history_back(&self) -> Option<Url> {
        self.window.lock().history_back()
    }

    pub(crate) fn history_forward(&self) -> Option<Url> {
        self.window.lock().history_forward()
    }

    // -----------------------------------------------------------------------
    // Soft navigation steps
    // -----------------------------------------------------------------------

    /// Merge a fetched page into this one: content, title, description,
    /// history entry, and the active sidebar link.
    pub(crate) fn apply_fragment(
        &self,
        fragment: &PageFragment,
        target: &Url,
        history: HistoryMode,
    ) -> Result<()> {
        let mut window = self.window.lock();
        let doc = window.document_mut();
        let root = doc.root();
        let live = doc
            .select_first(root, &self.selectors.content_region)
            .ok_or_else(|| {
                DocNavError::structural(format!(
                    "current page has no element matching {}",
                    self.selectors.content_region
                ))
            })?;

        doc.replace_children_from(live, fragment.document(), fragment.content());
        if !fragment.title().is_empty() {
            doc.set_title(fragment.title());
        }
        if let Some(description) = fragment.description() {
            doc.set_meta_content("description", description);
        }

        match history {
            HistoryMode::Push => window.push_state(target.clone()),
            HistoryMode::Replace => window.replace_state(target.clone()),
        }
        mark_active_link(window.document_mut(), &self.selectors.nav_link, target.path());

        debug!(title = %fragment.title(), "content region replaced");
        Ok(())
    }

    /// Jump to the target's anchor, or to the top when it has none.
    pub(crate) fn resolve_scroll(&self, target: &Url) {
        let mut pipeline = self.hydration.lock();
        let mut window = self.window.lock();
        match target.fragment().filter(|f| !f.is_empty()) {
            Some(anchor) => {
                if let Some(node) = window.document().get_element_by_id(anchor) {
                    window.scroll_into_view(node);
                }
            }
            None => window.scroll_to(0.0),
        }
        pipeline.on_scroll(&mut window);
    }

    /// Scroll the window and let the outline follow. Returns the active entry.
    pub fn scroll_to(&self, y: f64) -> Option<String> {
        let mut pipeline = self.hydration.lock();
        let mut window = self.window.lock();
        window.scroll_to(y);
        pipeline.on_scroll(&mut window)
    }

    // -----------------------------------------------------------------------
    // Click listeners
    // -----------------------------------------------------------------------

    /// Target plus its ancestors, innermost first.
    pub(crate) fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let window = self.window.lock();
        std::iter::once(target)
            .chain(window.document().ancestors(target))
            .collect()
    }

    pub(crate) fn is_copy_button(&self, node: NodeId) -> bool {
        code_blocks::is_copy_button(self.window.lock().document(), node)
    }

    pub(crate) fn press_copy_button(&self, clipboard: &dyn Clipboard, button: NodeId) -> CopyOutcome {
        code_blocks::press_copy_button(&self.window, clipboard, button, &self.config.hydration)
    }

    pub(crate) fn toggle_theme(&self) -> docnav_shared::Theme {
        self.shell.toggle_theme(&mut self.window.lock())
    }

    pub(crate) fn toggle_sidebar(&self) -> bool {
        self.shell.toggle_sidebar(&mut self.window.lock())
    }

    pub(crate) fn close_sidebar_on_outside_click(&self, target: NodeId) -> bool {
        self.shell
            .close_sidebar_on_outside_click(&mut self.window.lock(), target)
    }

    pub(crate) fn link_decision(&self, target: NodeId, pointer: Pointer) -> LinkDecision {
        let window = self.window.lock();
        decide_link(
            window.document(),
            target,
            pointer,
            window.location(),
            &self.config.navigation,
        )
    }
}
