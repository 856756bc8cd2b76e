//! EthClip - Clipboard module
//!
//! Provides clipboard access and the address-normalizing poll loop

pub mod io;
pub mod monitor;

pub use io::{ClipboardError, ClipboardIo, SystemClipboard};
pub use monitor::{poll_once, ClipboardFactory, ClipboardMonitor, PollOutcome};
