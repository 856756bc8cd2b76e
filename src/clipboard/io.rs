//! EthClip - Clipboard access
//!
//! Text-only read/write over the system clipboard

use arboard::Clipboard;

/// Clipboard error type
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to read clipboard: {0}")]
    Read(String),
    #[error("Failed to write clipboard: {0}")]
    Write(String),
}

/// Text access to a clipboard
pub trait ClipboardIo {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard backed by arboard
///
/// The handle is opened lazily and dropped after any failure so the next
/// call reopens it.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn handle(&mut self) -> Result<&mut Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard handle missing".to_string()))
    }
}

impl ClipboardIo for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        let result = self.handle()?.get_text();
        match result {
            Ok(text) => Ok(text),
            // Images and other non-text content read as empty
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => {
                self.inner = None;
                Err(ClipboardError::Read(e.to_string()))
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.handle()?.set_text(text);
        result.map_err(|e| {
            self.inner = None;
            ClipboardError::Write(e.to_string())
        })
    }
}
