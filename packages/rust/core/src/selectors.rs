//! Site selectors, parsed once per session.

use docnav_dom::Selector;
use docnav_shared::{Result, SelectorConfig};

/// Class of the per-entry outline links.
pub const TOC_LINK_CLASS: &str = "toc-link";

/// Class of injected copy buttons.
pub const COPY_BUTTON_CLASS: &str = "copy-btn";

/// Class of injected code headers.
pub const CODE_HEADER_CLASS: &str = "code-header";

/// Compiled form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct Selectors {
    pub content_region: Selector,
    pub article: Selector,
    pub toc_list: Selector,
    pub toc_container: Selector,
    pub sidebar: Selector,
    pub nav_link: Selector,
    pub theme_toggle: Selector,
    pub mobile_toggle: Selector,
    pub moon_icon: Selector,
    pub sun_icon: Selector,
    pub hint: Selector,
}

impl Selectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            content_region: Selector::parse(&config.content_region)?,
            article: Selector::parse(&config.article)?,
            toc_list: Selector::parse(&config.toc_list)?,
            toc_container: Selector::parse(&config.toc_container)?,
            sidebar: Selector::parse(&config.sidebar)?,
            nav_link: Selector::parse(&config.nav_link)?,
            theme_toggle: Selector::parse(&config.theme_toggle)?,
            mobile_toggle: Selector::parse(&config.mobile_toggle)?,
            moon_icon: Selector::parse(&config.moon_icon)?,
            sun_icon: Selector::parse(&config.sun_icon)?,
            hint: Selector::parse(&config.hint)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let selectors = Selectors::from_config(&SelectorConfig::default()).unwrap();
        assert_eq!(selectors.content_region.as_str(), "main.main");
    }

    #[test]
    fn bad_selector_is_rejected() {
        let config = SelectorConfig {
            toc_list: "#toc-list:first-child".into(),
            ..SelectorConfig::default()
        };
        assert!(Selectors::from_config(&config).is_err());
    }
}
