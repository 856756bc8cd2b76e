//! EthClip - Autostart module
//!
//! Registers the tray application to launch at user login using the
//! platform's native mechanism. Install and remove are both idempotent.

mod launch_agent;
mod run_key;
mod xdg;

use std::path::{Path, PathBuf};
use std::process::Command;

pub use launch_agent::LaunchAgent;
pub use run_key::{CurrentUserRun, RunKey, RunRegistry};
pub use xdg::XdgAutostart;

/// Name used for registry values, shortcuts and log files
pub const APP_NAME: &str = "EthClip";
/// Human-readable description shown by shortcut and desktop entries
pub const APP_DESCRIPTION: &str = "Ethereum Clipboard Monitor";
/// Binary launched at login
pub const APP_BINARY: &str = "ethclip";

/// Autostart error type
#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("Platform {0} not supported")]
    UnsupportedPlatform(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} failed: {detail}")]
    Command { program: String, detail: String },
    #[error("Could not locate the {0} directory")]
    MissingDirectory(&'static str),
    #[error("Could not locate the ethclip executable: {0}")]
    ExecutablePath(String),
    #[error("Registry error: {0}")]
    Registry(String),
}

/// Login-launch registration for one platform
pub trait AutostartManager {
    /// Mechanism name for log output
    fn name(&self) -> &'static str;
    /// Register the executable; installing twice is not an error
    fn install(&self) -> Result<(), AutostartError>;
    /// Unregister the executable; removing when absent is not an error
    fn remove(&self) -> Result<(), AutostartError>;
    fn is_installed(&self) -> Result<bool, AutostartError>;
}

/// Program registered to run at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub app_name: String,
    pub executable: PathBuf,
}

impl LaunchTarget {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            executable: executable.into(),
        }
    }

    /// The tray binary installed next to the running executable
    pub fn sibling_of_current_exe() -> Result<Self, AutostartError> {
        let current =
            std::env::current_exe().map_err(|e| AutostartError::ExecutablePath(e.to_string()))?;
        let dir = current
            .parent()
            .ok_or_else(|| AutostartError::ExecutablePath(current.display().to_string()))?;
        let executable = dir.join(format!("{}{}", APP_BINARY, std::env::consts::EXE_SUFFIX));
        Ok(Self::new(executable))
    }

    pub fn ensure_exists(&self) -> Result<(), AutostartError> {
        if self.executable.is_file() {
            Ok(())
        } else {
            Err(AutostartError::ExecutablePath(self.executable.display().to_string()))
        }
    }

    pub fn working_dir(&self) -> &Path {
        self.executable.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Select the autostart strategy for an OS name as reported by `std::env::consts::OS`
pub fn manager_for(
    os: &str,
    target: LaunchTarget,
) -> Result<Box<dyn AutostartManager>, AutostartError> {
    match os {
        "macos" => {
            let home = dirs::home_dir().ok_or(AutostartError::MissingDirectory("home"))?;
            Ok(Box::new(LaunchAgent::new(
                home.join("Library").join("LaunchAgents"),
                home.join("Library").join("Logs"),
                target,
            )))
        }
        "windows" => {
            let roaming = dirs::data_dir().ok_or(AutostartError::MissingDirectory("AppData"))?;
            let startup = roaming
                .join("Microsoft")
                .join("Windows")
                .join("Start Menu")
                .join("Programs")
                .join("Startup");
            Ok(Box::new(RunKey::new(startup, target)))
        }
        "linux" => {
            let config = dirs::config_dir().ok_or(AutostartError::MissingDirectory("config"))?;
            Ok(Box::new(XdgAutostart::new(config.join("autostart"), target)))
        }
        other => Err(AutostartError::UnsupportedPlatform(other.to_string())),
    }
}

/// Strategy for the running platform
pub fn detect(target: LaunchTarget) -> Result<Box<dyn AutostartManager>, AutostartError> {
    manager_for(std::env::consts::OS, target)
}

/// Autostart command requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartAction {
    Install,
    Remove,
}

/// Apply `action` with `manager`, returning whether autostart was installed beforehand
pub fn apply(action: AutostartAction, manager: &dyn AutostartManager) -> Result<bool, AutostartError> {
    log::info!("[Autostart] Using {}", manager.name());
    let was_installed = manager.is_installed()?;
    match action {
        AutostartAction::Install => manager.install()?,
        AutostartAction::Remove => manager.remove()?,
    }
    Ok(was_installed)
}

/// Install or remove autostart for the tray binary next to the running executable
pub fn execute(action: AutostartAction) -> Result<bool, AutostartError> {
    let target = LaunchTarget::sibling_of_current_exe()?;
    if action == AutostartAction::Install {
        target.ensure_exists()?;
    }
    let manager = detect(target)?;
    apply(action, manager.as_ref())
}

/// Run a helper program, turning a non-zero exit into an error
fn run_command(program: &str, args: &[String]) -> Result<(), AutostartError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| AutostartError::Command {
            program: program.to_string(),
            detail: e.to_string(),
        })?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(AutostartError::Command {
        program: program.to_string(),
        detail: if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_is_reported() {
        let result = manager_for("haiku", LaunchTarget::new("/opt/ethclip"));
        match result {
            Err(AutostartError::UnsupportedPlatform(os)) => assert_eq!(os, "haiku"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(manager) => panic!("unexpected manager: {}", manager.name()),
        }
    }

    #[test]
    fn test_unsupported_platform_message() {
        let err = AutostartError::UnsupportedPlatform("haiku".to_string());
        assert_eq!(err.to_string(), "Platform haiku not supported");
    }

    #[test]
    fn test_working_dir_is_executable_parent() {
        let target = LaunchTarget::new("/opt/ethclip/bin/ethclip");
        assert_eq!(target.working_dir(), Path::new("/opt/ethclip/bin"));
        assert_eq!(target.app_name, APP_NAME);
    }

    #[test]
    fn test_apply_dispatches_to_manager() {
        let dir = tempfile::tempdir().unwrap();
        let xdg = XdgAutostart::new(dir.path().to_path_buf(), LaunchTarget::new("/usr/bin/ethclip"));

        assert!(!apply(AutostartAction::Install, &xdg).unwrap());
        assert!(xdg.is_installed().unwrap());
        assert!(apply(AutostartAction::Install, &xdg).unwrap());

        assert!(apply(AutostartAction::Remove, &xdg).unwrap());
        assert!(!xdg.is_installed().unwrap());
        assert!(!apply(AutostartAction::Remove, &xdg).unwrap());
    }

    #[test]
    fn test_ensure_exists_rejects_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let target = LaunchTarget::new(dir.path().join("ethclip"));
        assert!(matches!(
            target.ensure_exists(),
            Err(AutostartError::ExecutablePath(_))
        ));
        std::fs::write(&target.executable, b"").unwrap();
        assert!(target.ensure_exists().is_ok());
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let result = run_command("ethclip-definitely-missing-helper", &[]);
        assert!(matches!(result, Err(AutostartError::Command { .. })));
    }
}
