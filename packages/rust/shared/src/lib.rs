//! Shared types, error model, and configuration for docnav.
//!
//! This crate is the foundation depended on by all other docnav crates.
//! It provides:
//! - [`DocNavError`], the unified error type
//! - Domain types ([`TocEntry`], [`HeadingLevel`], [`Theme`], [`ApiCard`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, HydrationConfig, NavigationConfig, SelectorConfig, ShellConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocNavError, Result};
pub use types::{ApiCard, ApiRow, HeadingLevel, THEME_STORAGE_KEY, Theme, TocEntry};
