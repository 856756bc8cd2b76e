//! EthClip - Ethereum address clipboard normalizer
//!
//! A tray-only background tool that watches the clipboard and rewrites
//! Ethereum addresses into a single canonical form, either all-lowercase
//! or EIP-55 checksum case.

pub mod address;
pub mod autostart;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod context;
pub mod hotkey;
pub mod runtime;
pub mod sound;
pub mod tray;

use tauri::{Manager, RunEvent};

use config::Settings;
use runtime::AppRuntime;

/// Application main entry point
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("EthClip starting...");

    let settings = Settings::load();
    let shortcut = settings.shortcut.clone();
    let runtime = AppRuntime::new(&settings);

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|_app, _args, _cwd| {
            log::info!("Second instance detected, keeping the running monitor");
        }))
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .manage(runtime)
        .setup(move |app| {
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let app_handle = app.handle().clone();
            let runtime = app_handle.state::<AppRuntime>();

            // Without a tray there is no way to control or quit the app
            let tray = match tray::create_tray(
                &app_handle,
                runtime.context.mode(),
                runtime.context.is_monitoring(),
            ) {
                Ok(tray) => tray,
                Err(e) => {
                    log::error!("Failed to create tray: {}", e);
                    return Err(e.into());
                }
            };
            runtime.attach_tray(tray);

            hotkey::register_or_warn(&app_handle, &shortcut);

            runtime.monitor.start();
            runtime.refresh_tray();

            log::info!("EthClip initialized successfully");
            Ok(())
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(e) => {
            log::error!("Error while building tauri application: {}", e);
            std::process::exit(1);
        }
    };

    app.run(|app_handle, event| match event {
        // No windows; stay alive until Quit
        RunEvent::ExitRequested { code: None, api, .. } => api.prevent_exit(),
        RunEvent::Exit => commands::shutdown(app_handle),
        _ => {}
    });
}
