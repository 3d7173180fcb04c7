//! Clipboard seam for copy buttons.

use parking_lot::Mutex;

use docnav_shared::{DocNavError, Result};

/// Receives copied text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Keeps the last written text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}

/// A clipboard the host refuses to write to.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedClipboard;

impl Clipboard for DeniedClipboard {
    fn write_text(&self, _text: &str) -> Result<()> {
        Err(DocNavError::Clipboard("write permission denied".into()))
    }
}
