//! Persistent theme preference.
//!
//! The only thing the site keeps in local storage is the theme, under
//! [`THEME_STORAGE_KEY`]. [`FileThemeStore`] mirrors that as a small JSON
//! object on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use docnav_shared::{DocNavError, Result, THEME_STORAGE_KEY, Theme, config_dir};

/// File name of the on-disk preference store.
const PREFS_FILE: &str = "prefs.json";

/// Loads and saves the theme choice.
pub trait ThemeStore: Send + Sync {
    /// The stored theme, or `None` if nothing was stored.
    fn load(&self) -> Result<Option<Theme>>;

    fn save(&self, theme: Theme) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    theme: Mutex<Option<Theme>>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(Some(theme)),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Result<Option<Theme>> {
        Ok(*self.theme.lock())
    }

    fn save(&self, theme: Theme) -> Result<()> {
        *self.theme.lock() = Some(theme);
        Ok(())
    }
}

/// JSON file store, `{"theme": "light"}`.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the docnav config directory.
    pub fn in_config_dir() -> Result<Self> {
        Ok(Self::new(config_dir()?.join(PREFS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw =
            std::fs::read_to_string(&self.path).map_err(|e| DocNavError::io(&self.path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| DocNavError::Storage(format!("{}: {e}", self.path.display())))
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>> {
        let map = self.read_map()?;
        match map.get(THEME_STORAGE_KEY) {
            Some(raw) => match raw.parse() {
                Ok(theme) => Ok(Some(theme)),
                Err(e) => {
                    warn!(error = %e, "ignoring unrecognized stored theme");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save(&self, theme: Theme) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(THEME_STORAGE_KEY.to_string(), theme.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocNavError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| DocNavError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| DocNavError::io(&self.path, e))?;

        debug!(path = %self.path.display(), %theme, "theme saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("docnav-prefs-{}-{name}", std::process::id()))
            .join(PREFS_FILE)
    }

    #[test]
    fn file_store_round_trips_theme() {
        let path = temp_path("roundtrip");
        let store = FileThemeStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        store.save(Theme::Light).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Light));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"light\""));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unknown_stored_value_reads_as_none() {
        let path = temp_path("unknown");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"theme": "sepia"}"#).unwrap();

        assert_eq!(FileThemeStore::new(&path).load().unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn memory_store() {
        let store = MemoryThemeStore::with_theme(Theme::Dark);
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));
        store.save(Theme::Light).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Light));
    }
}
