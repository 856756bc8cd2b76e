//! freedesktop.org autostart entry

use std::fs;
use std::path::PathBuf;

use super::{AutostartError, AutostartManager, LaunchTarget, APP_DESCRIPTION};

/// `<config_dir>/autostart/<app>.desktop`
pub struct XdgAutostart {
    autostart_dir: PathBuf,
    target: LaunchTarget,
}

impl XdgAutostart {
    pub fn new(autostart_dir: PathBuf, target: LaunchTarget) -> Self {
        Self {
            autostart_dir,
            target,
        }
    }

    pub fn entry_path(&self) -> PathBuf {
        self.autostart_dir
            .join(format!("{}.desktop", self.target.app_name.to_lowercase()))
    }

    /// Desktop entry contents
    pub fn render(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name={name}\n\
             Comment={comment}\n\
             Exec={exec}\n\
             Path={workdir}\n\
             Terminal=false\n\
             NoDisplay=true\n\
             X-GNOME-Autostart-enabled=true\n",
            name = self.target.app_name,
            comment = APP_DESCRIPTION,
            exec = exec_quote(&self.target.executable.display().to_string()),
            workdir = self.target.working_dir().display(),
        )
    }
}

impl AutostartManager for XdgAutostart {
    fn name(&self) -> &'static str {
        "XDG autostart"
    }

    fn install(&self) -> Result<(), AutostartError> {
        fs::create_dir_all(&self.autostart_dir)?;
        let entry = self.entry_path();
        fs::write(&entry, self.render())?;
        log::info!("[Autostart] Wrote {:?}", entry);
        Ok(())
    }

    fn remove(&self) -> Result<(), AutostartError> {
        let entry = self.entry_path();
        match fs::remove_file(&entry) {
            Ok(()) => {
                log::info!("[Autostart] Removed {:?}", entry);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_installed(&self) -> Result<bool, AutostartError> {
        Ok(self.entry_path().is_file())
    }
}

/// Quote a program path for the `Exec` key
fn exec_quote(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for ch in path.chars() {
        if matches!(ch, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
