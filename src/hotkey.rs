//! EthClip - Global shortcut
//!
//! Binds the mode toggle to a system-wide key chord.

use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use crate::commands;
use crate::runtime::AppRuntime;

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Invalid shortcut '{chord}': {reason}")]
    Parse { chord: String, reason: String },
    #[error("Failed to register shortcut '{chord}': {source}")]
    Register {
        chord: String,
        #[source]
        source: tauri_plugin_global_shortcut::Error,
    },
}

/// `chord` as shown to the user, with `CmdOrCtrl` resolved for this platform
pub fn display_chord(chord: &str) -> String {
    let primary = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
    chord
        .split('+')
        .map(|key| {
            let key = key.trim();
            match key.to_ascii_lowercase().as_str() {
                "cmdorctrl" | "cmdorcontrol" | "commandorctrl" | "commandorcontrol" => primary,
                _ => key,
            }
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// Startup banner line describing the mode toggle
pub fn banner(chord: &str) -> String {
    format!(
        "Press {} to toggle between lowercase/checksum modes",
        display_chord(chord)
    )
}

pub fn parse_chord(chord: &str) -> Result<Shortcut, HotkeyError> {
    chord.parse::<Shortcut>().map_err(|e| HotkeyError::Parse {
        chord: chord.to_string(),
        reason: e.to_string(),
    })
}

/// Register `chord` to toggle the normalization mode
pub fn register(app: &AppHandle, chord: &str) -> Result<(), HotkeyError> {
    let shortcut = parse_chord(chord)?;

    // Drop anything left over from a previous registration
    let _ = app.global_shortcut().unregister_all();

    app.global_shortcut()
        .on_shortcut(shortcut, |app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                log::debug!("[Hotkey] Mode toggle pressed");
                let runtime = app.state::<AppRuntime>();
                commands::toggle_mode(&runtime);
            }
        })
        .map_err(|source| HotkeyError::Register {
            chord: chord.to_string(),
            source,
        })?;

    log::info!("[Hotkey] Shortcut '{}' registered", chord);
    Ok(())
}

/// Register the shortcut, logging a hint instead of failing startup
pub fn register_or_warn(app: &AppHandle, chord: &str) -> bool {
    match register(app, chord) {
        Ok(()) => {
            log::info!("{}", banner(chord));
            true
        }
        Err(e) => {
            log::error!("[Hotkey] {}", e);
            if cfg!(target_os = "macos") {
                log::warn!(
                    "[Hotkey] Grant accessibility access in System Settings > Privacy & Security, \
                     or use the tray menu to switch modes"
                );
            } else {
                log::warn!("[Hotkey] Use the tray menu to switch modes");
            }
            false
        }
    }
}
