//! EthClip - Application runtime
//!
//! Everything the tray, hotkey and quit handlers need, managed as Tauri state

use std::sync::Arc;

use parking_lot::Mutex;

use crate::clipboard::{ClipboardError, ClipboardFactory, ClipboardIo, ClipboardMonitor, SystemClipboard};
use crate::config::Settings;
use crate::context::AppContext;
use crate::sound::Notifier;
use crate::tray::TrayHandle;

pub struct AppRuntime {
    pub context: Arc<AppContext>,
    pub monitor: ClipboardMonitor,
    pub notifier: Notifier,
    clipboard: ClipboardFactory,
    tray: Mutex<Option<TrayHandle>>,
}

impl AppRuntime {
    /// Runtime wired to the system clipboard and the platform sound player
    pub fn new(settings: &Settings) -> Self {
        let context = Arc::new(AppContext::new(settings.initial_mode));
        let clipboard: ClipboardFactory =
            Arc::new(|| Box::new(SystemClipboard::new()) as Box<dyn ClipboardIo>);
        let monitor = ClipboardMonitor::new(
            Arc::clone(&context),
            Arc::clone(&clipboard),
            settings.poll_interval_ms,
            settings.error_backoff_ms,
        );
        let notifier = Notifier::detect(settings.sound_enabled);
        Self::from_parts(context, monitor, notifier, clipboard)
    }

    pub fn from_parts(
        context: Arc<AppContext>,
        monitor: ClipboardMonitor,
        notifier: Notifier,
        clipboard: ClipboardFactory,
    ) -> Self {
        Self {
            context,
            monitor,
            notifier,
            clipboard,
            tray: Mutex::new(None),
        }
    }

    /// Read the clipboard outside the poll loop
    pub fn read_clipboard(&self) -> Result<String, ClipboardError> {
        (self.clipboard)().read_text()
    }

    pub fn attach_tray(&self, tray: TrayHandle) {
        *self.tray.lock() = Some(tray);
    }

    /// Take the tray out of the runtime for teardown
    pub fn release_tray(&self) -> Option<TrayHandle> {
        self.tray.lock().take()
    }

    /// Redraw the tray for the current mode and monitoring state
    pub fn refresh_tray(&self) {
        let mode = self.context.mode();
        let enabled = self.context.is_monitoring();
        if let Some(tray) = self.tray.lock().as_ref() {
            if let Err(e) = tray.update(mode, enabled) {
                log::warn!("[Tray] Failed to update tray: {}", e);
            }
        }
    }
}
