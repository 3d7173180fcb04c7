//! Headless soft-navigation engine for documentation sites.
//!
//! A [`Session`] loads a docs page, hydrates it (code block chrome, API
//! cards, outline with scroll spy, icons), wires the site shell once, and
//! turns same-origin link clicks into fetch-and-swap navigations of the
//! content region. Host capabilities (layout, clipboard, theme storage,
//! highlighting) sit behind traits so the engine runs without a browser.

pub mod api_cards;
pub mod clipboard;
pub mod code_blocks;
pub mod events;
pub mod geometry;
pub mod highlight;
pub mod hydrate;
pub mod icons;
pub mod navigation;
pub mod page;
pub mod prefs;
pub mod scroll_spy;
pub mod selectors;
pub mod session;
pub mod shell;
pub mod sidebar;
pub mod toc;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use clipboard::{Clipboard, DeniedClipboard, MemoryClipboard};
pub use code_blocks::CopyOutcome;
pub use events::{EventBus, Modifiers, MouseButton, PageEvent, Pointer};
pub use geometry::{FixedLayout, Geometry, NoLayout, Rect};
pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
pub use hydrate::{HydrationPipeline, HydrationReport};
pub use navigation::{
    FallbackReason, HistoryMode, LinkDecision, NavOutcome, NavigateOptions, NavigationController,
    SkipReason, decide_link,
};
pub use page::Page;
pub use prefs::{FileThemeStore, MemoryThemeStore, ThemeStore};
pub use selectors::Selectors;
pub use session::{ClickEffect, ClickReport, Services, Session};
pub use shell::Shell;
pub use toc::slugify;
pub use window::{History, Viewport, Window};
