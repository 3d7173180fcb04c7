//! Application configuration for docnav.
//!
//! User config lives at `~/.docnav/docnav.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocNavError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docnav.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docnav";

// ---------------------------------------------------------------------------
// Config structs (matching docnav.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Soft-navigation behavior.
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Selectors locating the site chrome and content.
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Per-page transform settings.
    #[serde(default)]
    pub hydration: HydrationConfig,

    /// One-time shell wiring settings.
    #[serde(default)]
    pub shell: ShellConfig,
}

/// `[navigation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Header sent with every soft-navigation fetch.
    #[serde(default = "default_marker_header")]
    pub marker_header: String,

    /// Value of the marker header.
    #[serde(default = "default_marker_value")]
    pub marker_value: String,

    /// Path prefixes that are never intercepted (API endpoints).
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_path_prefixes: Vec<String>,

    /// Path suffixes that are never intercepted (feeds, sitemaps).
    #[serde(default = "default_excluded_suffixes")]
    pub excluded_path_suffixes: Vec<String>,

    /// Attribute that opts a link out of interception when set to `"1"`.
    #[serde(default = "default_opt_out_attr")]
    pub opt_out_attr: String,

    /// Class set on the document root while a navigation is in flight.
    #[serde(default = "default_loading_class")]
    pub loading_class: String,

    /// Timeout for fragment fetches in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            marker_header: default_marker_header(),
            marker_value: default_marker_value(),
            excluded_path_prefixes: default_excluded_prefixes(),
            excluded_path_suffixes: default_excluded_suffixes(),
            opt_out_attr: default_opt_out_attr(),
            loading_class: default_loading_class(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_marker_header() -> String {
    "X-Docnav-Navigation".into()
}
fn default_marker_value() -> String {
    "1".into()
}
fn default_excluded_prefixes() -> Vec<String> {
    vec!["/api/".into()]
}
fn default_excluded_suffixes() -> Vec<String> {
    vec![".xml".into()]
}
fn default_opt_out_attr() -> String {
    "data-no-nav".into()
}
fn default_loading_class() -> String {
    "nav-loading".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[selectors]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// The live content region swapped on every soft navigation.
    #[serde(default = "default_content_region")]
    pub content_region: String,

    /// Rendered article inside the content region (headings, API lists).
    #[serde(default = "default_article")]
    pub article: String,

    /// Outline list rebuilt on every hydration pass.
    #[serde(default = "default_toc_list")]
    pub toc_list: String,

    /// Scrollable container around the outline list.
    #[serde(default = "default_toc_container")]
    pub toc_container: String,

    /// Off-canvas sidebar panel.
    #[serde(default = "default_sidebar")]
    pub sidebar: String,

    /// Sidebar navigation links.
    #[serde(default = "default_nav_link")]
    pub nav_link: String,

    /// Theme toggle button.
    #[serde(default = "default_theme_toggle")]
    pub theme_toggle: String,

    /// Mobile sidebar toggle button.
    #[serde(default = "default_mobile_toggle")]
    pub mobile_toggle: String,

    /// Icon shown while the dark theme is active.
    #[serde(default = "default_moon_icon")]
    pub moon_icon: String,

    /// Icon shown while the light theme is active.
    #[serde(default = "default_sun_icon")]
    pub sun_icon: String,

    /// Hint callouts, rendered by their own component.
    #[serde(default = "default_hint")]
    pub hint: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            content_region: default_content_region(),
            article: default_article(),
            toc_list: default_toc_list(),
            toc_container: default_toc_container(),
            sidebar: default_sidebar(),
            nav_link: default_nav_link(),
            theme_toggle: default_theme_toggle(),
            mobile_toggle: default_mobile_toggle(),
            moon_icon: default_moon_icon(),
            sun_icon: default_sun_icon(),
            hint: default_hint(),
        }
    }
}

fn default_content_region() -> String {
    "main.main".into()
}
fn default_article() -> String {
    ".md-content".into()
}
fn default_toc_list() -> String {
    "#toc-list".into()
}
fn default_toc_container() -> String {
    ".toc".into()
}
fn default_sidebar() -> String {
    "#sidebar".into()
}
fn default_nav_link() -> String {
    ".nav-link".into()
}
fn default_theme_toggle() -> String {
    "#theme-toggle".into()
}
fn default_mobile_toggle() -> String {
    "#mobile-toggle".into()
}
fn default_moon_icon() -> String {
    ".theme-icon-moon".into()
}
fn default_sun_icon() -> String {
    ".theme-icon-sun".into()
}
fn default_hint() -> String {
    ".mdoc-hint".into()
}

/// `[hydration]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationConfig {
    /// How long the "Copied!" acknowledgment stays up.
    #[serde(default = "default_copy_success_ms")]
    pub copy_success_ms: u64,

    /// How long the "Failed" state stays up.
    #[serde(default = "default_copy_failure_ms")]
    pub copy_failure_ms: u64,

    /// Whether code blocks are syntax highlighted.
    #[serde(default = "default_true")]
    pub highlight: bool,

    /// Left padding applied to level-3 outline entries, in pixels.
    #[serde(default = "default_nested_indent")]
    pub nested_indent_px: u32,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            copy_success_ms: default_copy_success_ms(),
            copy_failure_ms: default_copy_failure_ms(),
            highlight: true,
            nested_indent_px: default_nested_indent(),
        }
    }
}

fn default_copy_success_ms() -> u64 {
    2000
}
fn default_copy_failure_ms() -> u64 {
    900
}
fn default_true() -> bool {
    true
}
fn default_nested_indent() -> u32 {
    35
}

/// `[shell]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Class on the document root that selects the light theme.
    #[serde(default = "default_light_class")]
    pub light_class: String,

    /// Viewport width (inclusive) at or below which outside clicks close the sidebar.
    #[serde(default = "default_narrow_breakpoint")]
    pub narrow_breakpoint_px: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            light_class: default_light_class(),
            narrow_breakpoint_px: default_narrow_breakpoint(),
        }
    }
}

fn default_light_class() -> String {
    "light-theme".into()
}
fn default_narrow_breakpoint() -> u32 {
    1024
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docnav/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocNavError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docnav/docnav.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocNavError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocNavError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocNavError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocNavError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocNavError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
