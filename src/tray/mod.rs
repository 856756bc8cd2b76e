//! EthClip - System tray module
//!
//! Manages the tray icon and its menu

pub mod icon;

use tauri::{
    image::Image,
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    tray::{TrayIcon, TrayIconBuilder},
    AppHandle, Wry,
};

use crate::address::NormalizationMode;
use crate::commands;

pub const TRAY_ID: &str = "ethclip";

/// Tray menu item IDs
mod menu_ids {
    pub const TOGGLE_MONITORING: &str = "toggle_monitoring";
    pub const TOGGLE_MODE: &str = "toggle_mode";
    pub const SHOW_CLIPBOARD: &str = "show_clipboard";
    pub const QUIT: &str = "quit";
}

/// Action bound to a tray menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    ToggleMonitoring,
    ToggleMode,
    ShowClipboard,
    Quit,
}

impl TrayAction {
    pub fn from_menu_id(id: &str) -> Option<Self> {
        match id {
            menu_ids::TOGGLE_MONITORING => Some(TrayAction::ToggleMonitoring),
            menu_ids::TOGGLE_MODE => Some(TrayAction::ToggleMode),
            menu_ids::SHOW_CLIPBOARD => Some(TrayAction::ShowClipboard),
            menu_ids::QUIT => Some(TrayAction::Quit),
            _ => None,
        }
    }
}

pub fn mode_label(mode: NormalizationMode) -> String {
    format!("Mode: {}", mode.label())
}

pub fn tooltip(mode: NormalizationMode, enabled: bool) -> String {
    if enabled {
        format!("Ethereum Address Monitor - {}", mode.label())
    } else {
        "Ethereum Address Monitor - Paused".to_string()
    }
}

fn icon_image(mode: NormalizationMode, enabled: bool) -> Image<'static> {
    let bitmap = icon::render(mode, enabled);
    let (width, height) = bitmap.dimensions();
    Image::new_owned(bitmap.into_raw(), width, height)
}

/// Live tray icon plus the menu items whose state follows the app
pub struct TrayHandle {
    tray: TrayIcon<Wry>,
    enable_item: CheckMenuItem<Wry>,
    mode_item: CheckMenuItem<Wry>,
}

impl TrayHandle {
    /// Redraw icon, tooltip and menu state
    pub fn update(&self, mode: NormalizationMode, enabled: bool) -> tauri::Result<()> {
        self.tray.set_icon(Some(icon_image(mode, enabled)))?;
        self.tray.set_tooltip(Some(tooltip(mode, enabled)))?;
        self.enable_item.set_checked(enabled)?;
        self.mode_item.set_text(mode_label(mode))?;
        self.mode_item.set_checked(mode == NormalizationMode::Checksum)?;
        Ok(())
    }
}

/// Create system tray
pub fn create_tray(
    app: &AppHandle,
    mode: NormalizationMode,
    enabled: bool,
) -> tauri::Result<TrayHandle> {
    let enable_item = CheckMenuItem::with_id(
        app,
        menu_ids::TOGGLE_MONITORING,
        "Enable",
        true,
        enabled,
        None::<&str>,
    )?;
    let mode_item = CheckMenuItem::with_id(
        app,
        menu_ids::TOGGLE_MODE,
        mode_label(mode),
        true,
        mode == NormalizationMode::Checksum,
        None::<&str>,
    )?;
    let show_item = MenuItem::with_id(
        app,
        menu_ids::SHOW_CLIPBOARD,
        "Show Clipboard",
        true,
        None::<&str>,
    )?;
    let separator = PredefinedMenuItem::separator(app)?;
    let quit_item = MenuItem::with_id(app, menu_ids::QUIT, "Quit", true, None::<&str>)?;

    let menu = Menu::with_items(
        app,
        &[&enable_item, &mode_item, &show_item, &separator, &quit_item],
    )?;

    let tray = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(tooltip(mode, enabled))
        .icon(icon_image(mode, enabled))
        .on_menu_event(handle_menu_event)
        .build(app)?;

    log::info!("[Tray] Tray icon created");
    Ok(TrayHandle {
        tray,
        enable_item,
        mode_item,
    })
}

fn handle_menu_event(app: &AppHandle, event: MenuEvent) {
    let id = event.id().as_ref();
    match TrayAction::from_menu_id(id) {
        Some(action) => {
            log::debug!("[Tray] {:?} clicked", action);
            commands::dispatch(app, action);
        }
        None => log::debug!("[Tray] Unhandled menu event: {}", id),
    }
}
