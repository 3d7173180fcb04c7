//! Soft navigation: which links to intercept, and the fetch-and-swap that
//! replaces the content region without a full page load.
//!
//! Only the most recently started navigation may touch the page. Starting a
//! navigation cancels the previous one, and every step after an await checks
//! that its ticket is still current before going on.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use docnav_dom::{Document, NodeId, PageFragment};
use docnav_fetch::{FetchRequest, PageFetcher};
use docnav_shared::{DocNavError, NavigationConfig, Result};

use crate::events::{PageEvent, Pointer};
use crate::hydrate::HydrationReport;
use crate::page::Page;
use crate::selectors::Selectors;

// ---------------------------------------------------------------------------
// Link policy
// ---------------------------------------------------------------------------

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The click was not inside an `<a>`.
    NotALink,
    /// The link has a `download` attribute.
    Download,
    /// The link names a target browsing context.
    NamedTarget,
    /// The link opted out with the configured attribute.
    OptedOut,
    /// No `href`, or an empty one.
    MissingHref,
    /// `mailto:` or `tel:`.
    NonNavigableScheme,
    /// The `href` does not resolve to a URL.
    InvalidUrl,
    /// Different origin than the current page.
    ExternalOrigin,
    /// The path starts with an excluded prefix such as `/api/`.
    ExcludedPath,
    /// The path ends with an excluded suffix such as `.xml`.
    NonPageResource,
    /// Modifier keys or a non-primary button.
    ModifiedClick,
    /// Same path as the current page with a fragment.
    SamePageFragment,
}

/// What the click handler does with a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    Intercept(Url),
    Skip(SkipReason),
}

/// Decide whether a click on `target` becomes a soft navigation.
pub fn decide_link(
    doc: &Document,
    target: NodeId,
    pointer: Pointer,
    location: &Url,
    config: &NavigationConfig,
) -> LinkDecision {
    let Some(anchor) = doc.closest(target, |el| el.is("a")) else {
        return LinkDecision::Skip(SkipReason::NotALink);
    };
    let url = match eligible_url(doc, anchor, location, config) {
        Ok(url) => url,
        Err(reason) => return LinkDecision::Skip(reason),
    };
    if pointer.wants_new_context() {
        return LinkDecision::Skip(SkipReason::ModifiedClick);
    }
    let has_fragment = url.fragment().is_some_and(|f| !f.is_empty());
    if url.path() == location.path() && has_fragment {
        return LinkDecision::Skip(SkipReason::SamePageFragment);
    }
    LinkDecision::Intercept(url)
}

fn eligible_url(
    doc: &Document,
    anchor: NodeId,
    location: &Url,
    config: &NavigationConfig,
) -> std::result::Result<Url, SkipReason> {
    let el = doc.element(anchor).ok_or(SkipReason::NotALink)?;
    if el.has_attr("download") {
        return Err(SkipReason::Download);
    }
    if el.attr("target").is_some_and(|t| !t.is_empty()) {
        return Err(SkipReason::NamedTarget);
    }
    if el.attr(&config.opt_out_attr) == Some("1") {
        return Err(SkipReason::OptedOut);
    }

    let href = el
        .attr("href")
        .filter(|h| !h.is_empty())
        .ok_or(SkipReason::MissingHref)?;
    if href.starts_with("mailto:") || href.starts_with("tel:") {
        return Err(SkipReason::NonNavigableScheme);
    }

    let url = location.join(href).map_err(|_| SkipReason::InvalidUrl)?;
    if url.origin() != location.origin() {
        return Err(SkipReason::ExternalOrigin);
    }
    let path = url.path();
    if config
        .excluded_path_prefixes
        .iter()
        .any(|p| path.starts_with(p.as_str()))
    {
        return Err(SkipReason::ExcludedPath);
    }
    if config
        .excluded_path_suffixes
        .iter()
        .any(|s| path.ends_with(s.as_str()))
    {
        return Err(SkipReason::NonPageResource);
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Navigation outcomes
// ---------------------------------------------------------------------------

/// How the history entry is recorded after a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Push,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    pub history: HistoryMode,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self {
            history: HistoryMode::Push,
        }
    }

    pub fn replace() -> Self {
        Self {
            history: HistoryMode::Replace,
        }
    }
}

/// Why a soft navigation handed over to a full load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Status(u16),
    MissingContent(String),
    Transport(String),
    CrossOrigin,
}

impl From<&DocNavError> for FallbackReason {
    fn from(err: &DocNavError) -> Self {
        match err {
            DocNavError::Status { status, .. } => Self::Status(*status),
            DocNavError::Structural { message } => Self::MissingContent(message.clone()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "status {status}"),
            Self::MissingContent(message) => write!(f, "missing content: {message}"),
            Self::Transport(message) => write!(f, "{message}"),
            Self::CrossOrigin => f.write_str("cross-origin target"),
        }
    }
}

/// Result of [`NavigationController::navigate_to`].
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// The content region now shows the target.
    Swapped {
        url: Url,
        report: HydrationReport,
    },
    /// The same target was already loading; nothing was started.
    Duplicate,
    /// A newer navigation took over before this one finished.
    Cancelled,
    /// The page asked the host for a full load of `url` instead.
    HardNavigation { url: Url, reason: FallbackReason },
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct NavigationState {
    generation: u64,
    current: Option<CancellationToken>,
    inflight: Option<String>,
}

/// Proof of being the navigation that may touch the page.
#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    token: CancellationToken,
}

/// Ends a navigation when dropped: clears the in-flight marker and the
/// loading indicator, unless a newer navigation already owns both.
struct InflightGuard<'a> {
    state: &'a Mutex<NavigationState>,
    page: &'a Page,
    generation: u64,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let still_current = {
            let mut state = self.state.lock();
            if state.generation == self.generation {
                state.current = None;
                state.inflight = None;
                true
            } else {
                false
            }
        };
        if still_current {
            self.page.set_loading(false);
        }
    }
}

/// Runs soft navigations against one page at a time.
pub struct NavigationController<F> {
    fetcher: F,
    config: NavigationConfig,
    selectors: std::sync::Arc<Selectors>,
    state: Mutex<NavigationState>,
}

impl<F> std::fmt::Debug for NavigationController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> NavigationController<F> {
    pub fn new(
        fetcher: F,
        config: NavigationConfig,
        selectors: std::sync::Arc<Selectors>,
    ) -> Self {
        Self {
            fetcher,
            config,
            selectors,
            state: Mutex::new(NavigationState::default()),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// URL of the navigation currently loading, if any.
    pub fn inflight(&self) -> Option<String> {
        self.state.lock().inflight.clone()
    }

    /// Cancel whatever is loading, before the page is replaced by a full load.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if let Some(token) = state.current.take() {
            token.cancel();
        }
        state.inflight = None;
        state.generation += 1;
    }

    fn begin(&self, key: &str) -> Option<Ticket> {
        let mut state = self.state.lock();
        if state.inflight.as_deref() == Some(key) {
            return None;
        }
        if let Some(previous) = state.current.take() {
            previous.cancel();
        }
        state.generation += 1;
        let token = CancellationToken::new();
        state.current = Some(token.clone());
        state.inflight = Some(key.to_string());
        Some(Ticket {
            generation: state.generation,
            token,
        })
    }

    fn ensure_current(&self, ticket: &Ticket) -> Result<()> {
        if ticket.token.is_cancelled() || self.state.lock().generation != ticket.generation {
            return Err(DocNavError::Cancelled);
        }
        Ok(())
    }

    /// Fetch `target` and swap it into `page`.
    ///
    /// Anything that keeps the swap from completing, short of being
    /// superseded, turns into a request for a full load of `target`.
    #[instrument(skip_all, fields(target = %target))]
    pub async fn navigate_to(&self, page: &Page, target: Url, options: NavigateOptions) -> NavOutcome {
        if target.origin() != page.location().origin() {
            warn!("cross-origin target, leaving it to a full load");
            page.request_hard_navigation(target.clone());
            return NavOutcome::HardNavigation {
                url: target,
                reason: FallbackReason::CrossOrigin,
            };
        }

        let Some(ticket) = self.begin(target.as_str()) else {
            debug!("already loading this target");
            return NavOutcome::Duplicate;
        };
        let _guard = InflightGuard {
            state: &self.state,
            page,
            generation: ticket.generation,
        };
        if let Some(stale) = page.take_hard_navigation() {
            debug!(%stale, "dropping hard navigation superseded by this one");
        }
        page.set_loading(true);

        match self.fetch_and_swap(page, &target, options, &ticket).await {
            Ok(report) => {
                info!(outline = report.outline.len(), "content swapped");
                NavOutcome::Swapped {
                    url: target,
                    report,
                }
            }
            Err(err) if err.is_cancellation() => {
                debug!("superseded by a newer navigation");
                NavOutcome::Cancelled
            }
            Err(err) => {
                if self.ensure_current(&ticket).is_err() {
                    return NavOutcome::Cancelled;
                }
                warn!(error = %err, "soft navigation failed, falling back to a full load");
                page.request_hard_navigation(target.clone());
                NavOutcome::HardNavigation {
                    url: target,
                    reason: FallbackReason::from(&err),
                }
            }
        }
    }

    async fn fetch_and_swap(
        &self,
        page: &Page,
        target: &Url,
        options: NavigateOptions,
        ticket: &Ticket,
    ) -> Result<HydrationReport> {
        let request = FetchRequest::soft(target.clone());
        let response = tokio::select! {
            () = ticket.token.cancelled() => return Err(DocNavError::Cancelled),
            response = self.fetcher.fetch(&request) => response,
        };
        self.ensure_current(ticket)?;
        let response = response?;

        if !response.is_success() {
            return Err(DocNavError::Status {
                url: target.to_string(),
                status: response.status,
            });
        }

        let fragment = PageFragment::parse(&response.body, &self.selectors.content_region)?;
        self.ensure_current(ticket)?;

        page.apply_fragment(&fragment, target, options.history)?;
        let report = page.hydrate();
        page.emit(PageEvent::ContentUpdated {
            url: target.clone(),
        });
        page.resolve_scroll(target);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Modifiers, MouseButton};

    const LINKS: &str = r##"<html><body>
<a id="plain" href="/guide/setup"><span id="inner">Setup</span></a>
<a id="download" href="/file.pdf" download>f</a>
<a id="blank" href="/guide" target="_blank">g</a>
<a id="empty-target" href="/guide" target="">g</a>
<a id="optout" href="/guide" data-no-nav="1">g</a>
<a id="nohref">x</a>
<a id="mail" href="mailto:me@example.com">m</a>
<a id="tel" href="tel:123">t</a>
<a id="external" href="https://other.example.com/guide">e</a>
<a id="api" href="/api/v1/docs">a</a>
<a id="feed" href="/feed.xml">x</a>
<a id="hash" href="#usage">h</a>
<a id="other-hash" href="/other#usage">h</a>
<a id="bare-hash" href="/guide#">h</a>
<p id="para">text</p>
</body></html>"##;

    fn decide(id: &str, pointer: Pointer) -> LinkDecision {
        let doc = Document::parse(LINKS);
        let location = Url::parse("https://docs.example.com/guide").unwrap();
        let node = doc.get_element_by_id(id).unwrap();
        decide_link(&doc, node, pointer, &location, &NavigationConfig::default())
    }

    fn skip(id: &str) -> Option<SkipReason> {
        match decide(id, Pointer::primary()) {
            LinkDecision::Skip(reason) => Some(reason),
            LinkDecision::Intercept(_) => None,
        }
    }

    #[test]
    fn intercepts_same_origin_page_links_from_nested_targets() {
        let expected = Url::parse("https://docs.example.com/guide/setup").unwrap();
        assert_eq!(decide("inner", Pointer::primary()), LinkDecision::Intercept(expected));
        assert!(matches!(
            decide("other-hash", Pointer::primary()),
            LinkDecision::Intercept(_)
        ));
        // An empty fragment is not a jump within the page.
        assert!(matches!(
            decide("bare-hash", Pointer::primary()),
            LinkDecision::Intercept(_)
        ));
        assert!(matches!(
            decide("empty-target", Pointer::primary()),
            LinkDecision::Intercept(_)
        ));
    }

    #[test]
    fn skip_reasons() {
        assert_eq!(skip("para"), Some(SkipReason::NotALink));
        assert_eq!(skip("download"), Some(SkipReason::Download));
        assert_eq!(skip("blank"), Some(SkipReason::NamedTarget));
        assert_eq!(skip("optout"), Some(SkipReason::OptedOut));
        assert_eq!(skip("nohref"), Some(SkipReason::MissingHref));
        assert_eq!(skip("mail"), Some(SkipReason::NonNavigableScheme));
        assert_eq!(skip("tel"), Some(SkipReason::NonNavigableScheme));
        assert_eq!(skip("external"), Some(SkipReason::ExternalOrigin));
        assert_eq!(skip("api"), Some(SkipReason::ExcludedPath));
        assert_eq!(skip("feed"), Some(SkipReason::NonPageResource));
        assert_eq!(skip("hash"), Some(SkipReason::SamePageFragment));
    }

    #[test]
    fn modified_clicks_are_left_alone() {
        let meta = Pointer::primary().with_modifiers(Modifiers {
            meta: true,
            ..Default::default()
        });
        assert_eq!(decide("plain", meta), LinkDecision::Skip(SkipReason::ModifiedClick));

        let middle = Pointer::primary().with_button(MouseButton::Auxiliary);
        assert_eq!(decide("plain", middle), LinkDecision::Skip(SkipReason::ModifiedClick));
    }

    #[test]
    fn fallback_reason_from_errors() {
        let status = DocNavError::Status {
            url: "https://docs.example.com/x".into(),
            status: 503,
        };
        assert_eq!(FallbackReason::from(&status), FallbackReason::Status(503));
        assert!(matches!(
            FallbackReason::from(&DocNavError::structural("no main")),
            FallbackReason::MissingContent(_)
        ));
        assert!(matches!(
            FallbackReason::from(&DocNavError::Network("reset".into())),
            FallbackReason::Transport(_)
        ));
    }
}
