//! A browsing session over a documentation site.
//!
//! [`Session`] plays the browser: it performs full loads, dispatches clicks
//! the way DOM events bubble, drives history traversal, and follows hard
//! navigations the page asks for.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument};
use url::Url;

use docnav_dom::{Document, NodeId};
use docnav_fetch::{FetchRequest, PageFetcher};
use docnav_shared::{AppConfig, DocNavError, Result, Theme};

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::code_blocks::CopyOutcome;
use crate::events::{EventBus, PageEvent, Pointer};
use crate::geometry::{Geometry, NoLayout};
use crate::highlight::{Highlighter, SyntectHighlighter};
use crate::hydrate::{HydrationPipeline, HydrationReport};
use crate::navigation::{LinkDecision, NavOutcome, NavigateOptions, NavigationController, SkipReason};
use crate::page::Page;
use crate::prefs::{MemoryThemeStore, ThemeStore};
use crate::selectors::Selectors;
use crate::shell::Shell;
use crate::window::{History, Viewport, Window};

/// Host capabilities a session runs against.
#[derive(Clone)]
pub struct Services {
    pub clipboard: Arc<dyn Clipboard>,
    pub themes: Arc<dyn ThemeStore>,
    pub highlighter: Option<Arc<dyn Highlighter>>,
    pub geometry: Arc<dyn Geometry>,
    pub viewport: Viewport,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            clipboard: Arc::new(MemoryClipboard::new()),
            themes: Arc::new(MemoryThemeStore::new()),
            highlighter: Some(Arc::new(SyntectHighlighter::new())),
            geometry: Arc::new(NoLayout),
            viewport: Viewport::default(),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("highlighter", &self.highlighter.is_some())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// Something a click listener did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickEffect {
    ThemeChanged(Theme),
    SidebarToggled { open: bool },
    Copied(CopyOutcome),
    /// A link was clicked but left to the browser.
    LinkSkipped(SkipReason),
    Navigated(NavOutcome),
}

/// Everything that happened while dispatching one click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickReport {
    pub effects: Vec<ClickEffect>,
    /// A listener took over the default action.
    pub default_prevented: bool,
    /// A listener stopped the event before it reached the document.
    pub propagation_stopped: bool,
}

impl ClickReport {
    pub fn navigation(&self) -> Option<&NavOutcome> {
        self.effects.iter().find_map(|effect| match effect {
            ClickEffect::Navigated(outcome) => Some(outcome),
            _ => None,
        })
    }
}

pub struct Session<F> {
    config: Arc<AppConfig>,
    selectors: Arc<Selectors>,
    services: Services,
    controller: NavigationController<F>,
    events: EventBus,
    page: Page,
}

impl<F> std::fmt::Debug for Session<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("page", &self.page)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> Session<F> {
    /// Load `url` as a fresh document and hydrate it.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn open(fetcher: F, config: AppConfig, services: Services, url: Url) -> Result<Self> {
        let config = Arc::new(config);
        let selectors = Arc::new(Selectors::from_config(&config.selectors)?);
        let controller =
            NavigationController::new(fetcher, config.navigation.clone(), Arc::clone(&selectors));
        let events = EventBus::default();

        let page = full_load(
            &controller,
            &config,
            &selectors,
            &services,
            &events,
            History::new(url.clone()),
            url,
        )
        .await?;

        Ok(Self {
            config,
            selectors,
            services,
            controller,
            events,
            page,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn controller(&self) -> &NavigationController<F> {
        &self.controller
    }

    /// Receive [`PageEvent`]s for this and every later document.
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    /// Soft-navigate to `url`.
    pub async fn navigate_to(&self, url: Url, options: NavigateOptions) -> NavOutcome {
        self.controller.navigate_to(&self.page, url, options).await
    }

    /// Resolve `href` against the current location and soft-navigate.
    pub async fn visit(&self, href: &str) -> Result<NavOutcome> {
        let url = self
            .page
            .location()
            .join(href)
            .map_err(|e| DocNavError::parse(format!("{href}: {e}")))?;
        Ok(self.navigate_to(url, NavigateOptions::push()).await)
    }

    /// History back, as the browser's back button.
    pub async fn back(&self) -> Option<NavOutcome> {
        let url = self.page.history_back()?;
        Some(self.on_popstate(url).await)
    }

    pub async fn forward(&self) -> Option<NavOutcome> {
        let url = self.page.history_forward()?;
        Some(self.on_popstate(url).await)
    }

    async fn on_popstate(&self, url: Url) -> NavOutcome {
        debug!(%url, "history traversal");
        self.controller
            .navigate_to(&self.page, url, NavigateOptions::replace())
            .await
    }

    /// Scroll the window. Returns the active outline entry afterwards.
    pub fn scroll_to(&self, y: f64) -> Option<String> {
        self.page.scroll_to(y)
    }

    /// Dispatch a click on `target`.
    ///
    /// Element listeners run innermost first, then the document listeners:
    /// link interception, then closing the sidebar on an outside click. A
    /// soft navigation the click starts is awaited before returning.
    #[instrument(skip(self))]
    pub async fn click(&self, target: NodeId, pointer: Pointer) -> ClickReport {
        let mut report = ClickReport::default();

        for node in self.page.propagation_path(target) {
            let shell = self.page.shell();
            if shell.is_mobile_toggle(node) {
                let open = self.page.toggle_sidebar();
                report.effects.push(ClickEffect::SidebarToggled { open });
                report.propagation_stopped = true;
                return report;
            }
            if shell.is_theme_toggle(node) {
                let theme = self.page.toggle_theme();
                report.effects.push(ClickEffect::ThemeChanged(theme));
            }
            if self.page.is_copy_button(node) {
                let outcome = self
                    .page
                    .press_copy_button(self.services.clipboard.as_ref(), node);
                report.effects.push(ClickEffect::Copied(outcome));
            }
        }

        let navigation = match self.page.link_decision(target, pointer) {
            LinkDecision::Intercept(url) => {
                report.default_prevented = true;
                Some(url)
            }
            LinkDecision::Skip(SkipReason::NotALink) => None,
            LinkDecision::Skip(reason) => {
                debug!(?reason, "link left to the browser");
                report.effects.push(ClickEffect::LinkSkipped(reason));
                None
            }
        };

        if self.page.close_sidebar_on_outside_click(target) {
            report
                .effects
                .push(ClickEffect::SidebarToggled { open: false });
        }

        if let Some(url) = navigation {
            let outcome = self.navigate_to(url, NavigateOptions::push()).await;
            report.effects.push(ClickEffect::Navigated(outcome));
        }
        report
    }

    /// Perform the full load the page asked for, if any.
    ///
    /// The new document gets a fresh shell and hydration state; history
    /// carries over with the target pushed onto it.
    #[instrument(skip_all)]
    pub async fn follow_hard_navigation(&mut self) -> Result<Option<Url>> {
        let Some(url) = self.page.take_hard_navigation() else {
            return Ok(None);
        };
        info!(%url, "following hard navigation");
        self.controller.reset();

        let mut history = self.page.history();
        if history.current() != &url {
            history.push(url.clone());
        }
        self.page = full_load(
            &self.controller,
            &self.config,
            &self.selectors,
            &self.services,
            &self.events,
            history,
            url.clone(),
        )
        .await?;
        Ok(Some(url))
    }
}

/// Fetch and hydrate a document from scratch.
async fn full_load<F: PageFetcher>(
    controller: &NavigationController<F>,
    config: &Arc<AppConfig>,
    selectors: &Arc<Selectors>,
    services: &Services,
    events: &EventBus,
    history: History,
    url: Url,
) -> Result<Page> {
    let response = controller.fetcher().fetch(&FetchRequest::full(url.clone())).await?;
    if !response.is_success() {
        return Err(DocNavError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let document = Document::parse(&response.body);
    let window = Window::new(
        document,
        history,
        services.viewport,
        Arc::clone(&services.geometry),
    );
    let pipeline = HydrationPipeline::new(
        Arc::clone(selectors),
        config.hydration.clone(),
        services.highlighter.clone(),
    );
    let shell = Shell::new(
        config.shell.clone(),
        Arc::clone(selectors),
        Arc::clone(&services.themes),
    );
    let page = Page::new(
        window,
        pipeline,
        shell,
        Arc::clone(selectors),
        Arc::clone(config),
        events.clone(),
    );

    let report: HydrationReport = page.hydrate();
    info!(
        title = %page.title(),
        outline = report.outline.len(),
        "page loaded"
    );
    events.emit(PageEvent::Loaded { url });
    Ok(page)
}
