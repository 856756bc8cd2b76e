//! EthClip - Shared application context
//!
//! Holds the normalization mode, the clipboard snapshot and the monitoring
//! flag. Shared between the poll thread, the hotkey handler and the tray.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::address::NormalizationMode;

/// Last clipboard text processed by the poller, with the mode it was processed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub text: String,
    pub mode: NormalizationMode,
}

#[derive(Debug)]
struct SharedState {
    mode: NormalizationMode,
    snapshot: Option<ClipboardSnapshot>,
}

/// Process-wide state. Mode and snapshot live behind one lock so a
/// compare-and-update never sees one without the other.
#[derive(Debug)]
pub struct AppContext {
    state: Mutex<SharedState>,
    monitoring: AtomicBool,
}

impl AppContext {
    pub fn new(initial_mode: NormalizationMode) -> Self {
        Self {
            state: Mutex::new(SharedState {
                mode: initial_mode,
                snapshot: None,
            }),
            monitoring: AtomicBool::new(false),
        }
    }

    /// Current normalization mode
    pub fn mode(&self) -> NormalizationMode {
        self.state.lock().mode
    }

    /// Flip the mode and return the new one
    pub fn toggle_mode(&self) -> NormalizationMode {
        let mut state = self.state.lock();
        state.mode = state.mode.toggled();
        state.mode
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    /// Set the monitoring flag, returning the previous value
    pub(crate) fn set_monitoring(&self, enabled: bool) -> bool {
        self.monitoring.swap(enabled, Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<ClipboardSnapshot> {
        self.state.lock().snapshot.clone()
    }

    /// Record `current` as observed under the active mode.
    ///
    /// Returns the mode to process it under when either the text or the mode
    /// differs from the snapshot, `None` when there is nothing new.
    pub fn observe(&self, current: &str) -> Option<NormalizationMode> {
        let mut state = self.state.lock();
        let mode = state.mode;
        let unchanged = state
            .snapshot
            .as_ref()
            .map_or(false, |snap| snap.text == current && snap.mode == mode);
        if unchanged {
            return None;
        }
        state.snapshot = Some(ClipboardSnapshot {
            text: current.to_string(),
            mode,
        });
        Some(mode)
    }

    /// Record a value this process wrote to the clipboard
    pub fn record_write(&self, written: String, mode: NormalizationMode) {
        self.state.lock().snapshot = Some(ClipboardSnapshot {
            text: written,
            mode,
        });
    }

    /// Drop the snapshot so the next poll reprocesses whatever is on the clipboard
    pub fn invalidate_snapshot(&self) {
        self.state.lock().snapshot = None;
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(NormalizationMode::default())
    }
}
