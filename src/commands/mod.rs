//! EthClip - Commands module

pub mod handlers;

pub use handlers::{dispatch, quit, show_clipboard, shutdown, toggle_mode, toggle_monitoring};
