//! Windows registration: `HKCU\...\Run` value plus a Startup-folder shortcut

use std::fs;
use std::path::PathBuf;

use super::{run_command, AutostartError, AutostartManager, LaunchTarget, APP_DESCRIPTION};

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// String values under the current user's Run key
pub trait RunRegistry {
    fn get(&self, name: &str) -> Result<Option<String>, AutostartError>;
    fn set(&self, name: &str, command: &str) -> Result<(), AutostartError>;
    /// Delete `name`; `Ok(false)` when it was not there
    fn delete(&self, name: &str) -> Result<bool, AutostartError>;
}

/// `HKEY_CURRENT_USER` Run key through the Win32 registry API
pub struct CurrentUserRun;

#[cfg(windows)]
mod win32 {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
    use windows::Win32::System::Registry::{
        RegDeleteKeyValueW, RegGetValueW, RegSetKeyValueW, HKEY_CURRENT_USER, REG_SZ,
        RRF_RT_REG_SZ,
    };

    use super::{CurrentUserRun, RunRegistry, RUN_KEY};
    use crate::autostart::AutostartError;

    fn wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn check(operation: &str, status: WIN32_ERROR) -> Result<(), AutostartError> {
        if status == ERROR_SUCCESS {
            return Ok(());
        }
        Err(AutostartError::Registry(format!(
            "{} failed: {}",
            operation,
            windows::core::Error::from(status.to_hresult())
        )))
    }

    impl RunRegistry for CurrentUserRun {
        fn get(&self, name: &str) -> Result<Option<String>, AutostartError> {
            let key = wide(RUN_KEY);
            let value = wide(name);
            let mut size: u32 = 0;
            let status = unsafe {
                RegGetValueW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key.as_ptr()),
                    PCWSTR(value.as_ptr()),
                    RRF_RT_REG_SZ,
                    None,
                    None,
                    Some(&mut size as *mut u32),
                )
            };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(None);
            }
            check("RegGetValueW", status)?;

            let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
            let status = unsafe {
                RegGetValueW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key.as_ptr()),
                    PCWSTR(value.as_ptr()),
                    RRF_RT_REG_SZ,
                    None,
                    Some(buffer.as_mut_ptr().cast()),
                    Some(&mut size as *mut u32),
                )
            };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(None);
            }
            check("RegGetValueW", status)?;

            let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
            Ok(Some(String::from_utf16_lossy(&buffer[..len])))
        }

        fn set(&self, name: &str, command: &str) -> Result<(), AutostartError> {
            let key = wide(RUN_KEY);
            let value = wide(name);
            let data = wide(command);
            let status = unsafe {
                RegSetKeyValueW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key.as_ptr()),
                    PCWSTR(value.as_ptr()),
                    REG_SZ.0,
                    Some(data.as_ptr().cast()),
                    (data.len() * std::mem::size_of::<u16>()) as u32,
                )
            };
            check("RegSetKeyValueW", status)
        }

        fn delete(&self, name: &str) -> Result<bool, AutostartError> {
            let key = wide(RUN_KEY);
            let value = wide(name);
            let status = unsafe {
                RegDeleteKeyValueW(HKEY_CURRENT_USER, PCWSTR(key.as_ptr()), PCWSTR(value.as_ptr()))
            };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(false);
            }
            check("RegDeleteKeyValueW", status)?;
            Ok(true)
        }
    }
}

#[cfg(not(windows))]
impl RunRegistry for CurrentUserRun {
    fn get(&self, _name: &str) -> Result<Option<String>, AutostartError> {
        Err(AutostartError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    fn set(&self, _name: &str, _command: &str) -> Result<(), AutostartError> {
        Err(AutostartError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    fn delete(&self, _name: &str) -> Result<bool, AutostartError> {
        Err(AutostartError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

pub struct RunKey {
    startup_dir: PathBuf,
    target: LaunchTarget,
    registry: Box<dyn RunRegistry>,
}

impl RunKey {
    pub fn new(startup_dir: PathBuf, target: LaunchTarget) -> Self {
        Self::with_registry(startup_dir, target, Box::new(CurrentUserRun))
    }

    pub fn with_registry(
        startup_dir: PathBuf,
        target: LaunchTarget,
        registry: Box<dyn RunRegistry>,
    ) -> Self {
        Self {
            startup_dir,
            target,
            registry,
        }
    }

    pub fn shortcut_path(&self) -> PathBuf {
        self.startup_dir.join(format!("{}.lnk", self.target.app_name))
    }

    /// Command line stored in the Run value
    pub fn command_line(&self) -> String {
        format!("\"{}\"", self.target.executable.display())
    }

    /// PowerShell script creating the Startup-folder shortcut
    pub fn shortcut_script(&self) -> String {
        format!(
            "$s = (New-Object -ComObject WScript.Shell).CreateShortcut('{link}'); \
             $s.TargetPath = '{target}'; \
             $s.WorkingDirectory = '{workdir}'; \
             $s.Description = '{description}'; \
             $s.Save()",
            link = ps_quote(&self.shortcut_path().display().to_string()),
            target = ps_quote(&self.target.executable.display().to_string()),
            workdir = ps_quote(&self.target.working_dir().display().to_string()),
            description = ps_quote(APP_DESCRIPTION),
        )
    }

    fn create_shortcut(&self) -> Result<(), AutostartError> {
        fs::create_dir_all(&self.startup_dir)?;
        run_command(
            "powershell",
            &[
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                self.shortcut_script(),
            ],
        )
    }
}

impl AutostartManager for RunKey {
    fn name(&self) -> &'static str {
        "Registry Run key"
    }

    fn install(&self) -> Result<(), AutostartError> {
        self.registry.set(&self.target.app_name, &self.command_line())?;
        log::info!(
            "[Autostart] Registered {} under HKCU\\{}",
            self.target.app_name,
            RUN_KEY
        );

        // The Run value alone is enough to launch at login
        if let Err(e) = self.create_shortcut() {
            log::warn!("[Autostart] Could not create startup shortcut: {}", e);
            log::warn!(
                "[Autostart] Make sure Windows PowerShell is available to create {:?}",
                self.shortcut_path()
            );
        }
        Ok(())
    }

    fn remove(&self) -> Result<(), AutostartError> {
        if self.registry.delete(&self.target.app_name)? {
            log::info!(
                "[Autostart] Removed {} from HKCU\\{}",
                self.target.app_name,
                RUN_KEY
            );
        }

        let shortcut = self.shortcut_path();
        match fs::remove_file(&shortcut) {
            Ok(()) => log::info!("[Autostart] Removed {:?}", shortcut),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn is_installed(&self) -> Result<bool, AutostartError> {
        Ok(self.registry.get(&self.target.app_name)?.is_some())
    }
}

/// Escape a value for a single-quoted PowerShell string
fn ps_quote(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// In-memory Run key; `broken` makes every call fail like an access error
    #[derive(Clone, Default)]
    struct MemoryRegistry {
        values: Arc<Mutex<HashMap<String, String>>>,
        broken: bool,
    }

    impl MemoryRegistry {
        fn fail_if_broken(&self) -> Result<(), AutostartError> {
            if self.broken {
                return Err(AutostartError::Registry("access denied".to_string()));
            }
            Ok(())
        }
    }

    impl RunRegistry for MemoryRegistry {
        fn get(&self, name: &str) -> Result<Option<String>, AutostartError> {
            self.fail_if_broken()?;
            Ok(self.values.lock().get(name).cloned())
        }

        fn set(&self, name: &str, command: &str) -> Result<(), AutostartError> {
            self.fail_if_broken()?;
            self.values.lock().insert(name.to_string(), command.to_string());
            Ok(())
        }

        fn delete(&self, name: &str) -> Result<bool, AutostartError> {
            self.fail_if_broken()?;
            Ok(self.values.lock().remove(name).is_some())
        }
    }

    fn run_key(startup_dir: PathBuf, registry: MemoryRegistry) -> RunKey {
        RunKey::with_registry(
            startup_dir,
            LaunchTarget::new(r"C:\Program Files\EthClip\ethclip.exe"),
            Box::new(registry),
        )
    }

    #[test]
    fn test_registry_value_quotes_executable() {
        let key = run_key(PathBuf::from(r"C:\Startup"), MemoryRegistry::default());
        assert_eq!(key.command_line(), r#""C:\Program Files\EthClip\ethclip.exe""#);
    }

    #[test]
    fn test_install_and_remove_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = MemoryRegistry::default();
        let key = run_key(dir.path().to_path_buf(), registry.clone());

        key.install().unwrap();
        key.install().unwrap();
        assert!(key.is_installed().unwrap());
        assert_eq!(
            registry.values.lock().get("EthClip").cloned(),
            Some(key.command_line())
        );

        std::fs::write(key.shortcut_path(), b"lnk").unwrap();
        key.remove().unwrap();
        assert!(!key.is_installed().unwrap());
        assert!(!key.shortcut_path().exists());

        key.remove().unwrap();
    }

    #[test]
    fn test_registry_failure_fails_remove() {
        let dir = tempfile::tempdir().unwrap();
        let registry = MemoryRegistry {
            broken: true,
            ..MemoryRegistry::default()
        };
        let key = run_key(dir.path().to_path_buf(), registry);

        assert!(matches!(key.remove(), Err(AutostartError::Registry(_))));
        assert!(matches!(key.install(), Err(AutostartError::Registry(_))));
        assert!(key.is_installed().is_err());
    }

    #[test]
    fn test_shortcut_script_escapes_quotes() {
        let key = run_key(
            PathBuf::from(r"C:\Users\o'neil\Startup"),
            MemoryRegistry::default(),
        );
        let script = key.shortcut_script();
        assert!(script.contains("o''neil"));
        assert!(script.contains("EthClip.lnk"));
        assert!(script.contains("$s.Description = 'Ethereum Clipboard Monitor'"));
        assert!(script.ends_with("$s.Save()"));
    }
}
