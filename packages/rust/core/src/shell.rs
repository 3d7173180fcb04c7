//! Site chrome that lives for a whole document load: the theme toggle and
//! the collapsible sidebar.
//!
//! Soft navigations only replace the content region, so the chrome is wired
//! once per document. The [`OnceLock`] makes a second call a no-op.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use docnav_dom::{Document, NodeId};
use docnav_shared::{ShellConfig, Theme};

use crate::prefs::ThemeStore;
use crate::selectors::Selectors;
use crate::window::Window;

const SIDEBAR_OPEN_CLASS: &str = "open";

/// Chrome elements located when the shell was wired.
///
/// The theme icons are not bound here: icon rendering replaces them after
/// wiring, so they are looked up each time the theme changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellBindings {
    pub theme_toggle: Option<NodeId>,
    pub mobile_toggle: Option<NodeId>,
    pub sidebar: Option<NodeId>,
}

pub struct Shell {
    bindings: OnceLock<ShellBindings>,
    config: ShellConfig,
    selectors: Arc<Selectors>,
    store: Arc<dyn ThemeStore>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("bindings", &self.bindings.get())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Shell {
    pub fn new(config: ShellConfig, selectors: Arc<Selectors>, store: Arc<dyn ThemeStore>) -> Self {
        Self {
            bindings: OnceLock::new(),
            config,
            selectors,
            store,
        }
    }

    /// Wire the chrome unless it already is. Returns whether this call did it.
    pub fn init_once(&self, window: &mut Window) -> bool {
        let mut wired_now = false;
        self.bindings.get_or_init(|| {
            wired_now = true;
            self.wire(window)
        });
        wired_now
    }

    pub fn is_initialized(&self) -> bool {
        self.bindings.get().is_some()
    }

    pub fn bindings(&self) -> Option<&ShellBindings> {
        self.bindings.get()
    }

    fn wire(&self, window: &mut Window) -> ShellBindings {
        let doc = window.document_mut();
        let root = doc.root();
        let bindings = ShellBindings {
            theme_toggle: doc.select_first(root, &self.selectors.theme_toggle),
            mobile_toggle: doc.select_first(root, &self.selectors.mobile_toggle),
            sidebar: doc.select_first(root, &self.selectors.sidebar),
        };

        match self.store.load() {
            Ok(Some(theme)) => self.apply_theme(doc, theme),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read stored theme"),
        }
        let theme = self.current_theme(doc);
        self.update_theme_icons(doc, theme);

        debug!(?bindings, "shell wired");
        bindings
    }

    // -----------------------------------------------------------------------
    // Theme
    // -----------------------------------------------------------------------

    /// The theme the document currently shows.
    pub fn current_theme(&self, doc: &Document) -> Theme {
        let light = doc
            .document_element()
            .and_then(|html| doc.element(html))
            .is_some_and(|el| el.has_class(&self.config.light_class));
        if light { Theme::Light } else { Theme::Dark }
    }

    fn apply_theme(&self, doc: &mut Document, theme: Theme) {
        let Some(el) = doc.document_element().and_then(|html| doc.element_mut(html)) else {
            return;
        };
        match theme {
            Theme::Light => el.add_class(&self.config.light_class),
            Theme::Dark => el.remove_class(&self.config.light_class),
        }
    }

    /// Flip the theme, persist it, and swap the toggle icon.
    pub fn toggle_theme(&self, window: &mut Window) -> Theme {
        let doc = window.document_mut();
        let theme = self.current_theme(doc).flipped();
        self.apply_theme(doc, theme);
        if let Err(e) = self.store.save(theme) {
            warn!(error = %e, "could not persist theme");
        }
        if self.is_initialized() {
            self.update_theme_icons(doc, theme);
        }
        info!(%theme, "theme changed");
        theme
    }

    /// Show the moon icon in dark mode and the sun icon in light mode.
    fn update_theme_icons(&self, doc: &mut Document, theme: Theme) {
        let root = doc.root();
        let (Some(moon), Some(sun)) = (
            doc.select_first(root, &self.selectors.moon_icon),
            doc.select_first(root, &self.selectors.sun_icon),
        ) else {
            return;
        };
        let (moon_display, sun_display) = match theme {
            Theme::Light => ("none", "block"),
            Theme::Dark => ("block", "none"),
        };
        if let Some(el) = doc.element_mut(moon) {
            el.set_style("display", moon_display);
        }
        if let Some(el) = doc.element_mut(sun) {
            el.set_style("display", sun_display);
        }
    }

    // -----------------------------------------------------------------------
    // Sidebar
    // -----------------------------------------------------------------------

    pub fn is_theme_toggle(&self, node: NodeId) -> bool {
        self.bindings().and_then(|b| b.theme_toggle) == Some(node)
    }

    /// Only bound when both the toggle and the sidebar exist.
    pub fn is_mobile_toggle(&self, node: NodeId) -> bool {
        self.bindings()
            .is_some_and(|b| b.sidebar.is_some() && b.mobile_toggle == Some(node))
    }

    /// Open or close the sidebar. Returns whether it is open afterwards.
    pub fn toggle_sidebar(&self, window: &mut Window) -> bool {
        let Some(sidebar) = self.bindings().and_then(|b| b.sidebar) else {
            return false;
        };
        let open = window
            .document_mut()
            .element_mut(sidebar)
            .is_some_and(|el| el.toggle_class(SIDEBAR_OPEN_CLASS));
        debug!(open, "sidebar toggled");
        open
    }

    /// Close an open sidebar when a narrow-viewport click lands outside it
    /// and outside its toggle. Returns whether it closed.
    pub fn close_sidebar_on_outside_click(&self, window: &mut Window, target: NodeId) -> bool {
        let Some(ShellBindings {
            sidebar: Some(sidebar),
            mobile_toggle: Some(toggle),
            ..
        }) = self.bindings().copied()
        else {
            return false;
        };
        if window.viewport().width > self.config.narrow_breakpoint_px {
            return false;
        }

        let doc = window.document_mut();
        let is_open = doc
            .element(sidebar)
            .is_some_and(|el| el.has_class(SIDEBAR_OPEN_CLASS));
        if !is_open || doc.contains(sidebar, target) || doc.contains(toggle, target) {
            return false;
        }
        if let Some(el) = doc.element_mut(sidebar) {
            el.remove_class(SIDEBAR_OPEN_CLASS);
        }
        debug!("sidebar closed by outside click");
        true
    }
}
