//! EthClip - User command handlers
//!
//! Actions reachable from the tray menu and the global shortcut

use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::GlobalShortcutExt;

use crate::address::NormalizationMode;
use crate::runtime::AppRuntime;
use crate::tray::{TrayAction, TRAY_ID};

/// Flip the normalization mode, play its cue and redraw the tray
pub fn toggle_mode(runtime: &AppRuntime) -> NormalizationMode {
    let mode = runtime.context.toggle_mode();
    log::info!("Mode switched to: {}", mode);
    runtime.notifier.notify(mode);
    runtime.refresh_tray();
    mode
}

/// Pause or resume clipboard monitoring
pub fn toggle_monitoring(runtime: &AppRuntime) -> bool {
    let enabled = runtime.monitor.toggle();
    if enabled {
        log::info!("Monitoring resumed");
    } else {
        log::info!("Monitoring paused");
    }
    runtime.refresh_tray();
    enabled
}

/// Print the current clipboard text
pub fn show_clipboard(runtime: &AppRuntime) -> Option<String> {
    match runtime.read_clipboard() {
        Ok(text) => {
            println!("Current clipboard: {}", text);
            log::info!("Current clipboard: {}", text);
            Some(text)
        }
        Err(e) => {
            log::error!("Failed to read clipboard: {}", e);
            let last = runtime.context.snapshot().map(|snap| snap.text);
            if let Some(text) = &last {
                println!("Last seen clipboard: {}", text);
            }
            last
        }
    }
}

/// Tear down in order: poll loop, global shortcut, tray
pub fn shutdown(app: &AppHandle) {
    let runtime = app.state::<AppRuntime>();
    runtime.monitor.shutdown();

    if let Err(e) = app.global_shortcut().unregister_all() {
        log::warn!("[Hotkey] Failed to unregister shortcuts: {}", e);
    }

    drop(runtime.release_tray());
    drop(app.remove_tray_by_id(TRAY_ID));
}

/// Quit the application
pub fn quit(app: &AppHandle) {
    log::info!("Shutting down...");
    shutdown(app);
    app.exit(0);
}

/// Run the handler bound to a tray action
pub fn dispatch(app: &AppHandle, action: TrayAction) {
    let runtime = app.state::<AppRuntime>();
    match action {
        TrayAction::ToggleMonitoring => {
            toggle_monitoring(&runtime);
        }
        TrayAction::ToggleMode => {
            toggle_mode(&runtime);
        }
        TrayAction::ShowClipboard => {
            show_clipboard(&runtime);
        }
        TrayAction::Quit => quit(app),
    }
}
