//! macOS LaunchAgent registration

use std::fs;
use std::path::PathBuf;

use super::{run_command, AutostartError, AutostartManager, LaunchTarget};

/// `~/Library/LaunchAgents/com.<app>.plist`, loaded through `launchctl`
pub struct LaunchAgent {
    agents_dir: PathBuf,
    logs_dir: PathBuf,
    target: LaunchTarget,
    use_launchctl: bool,
}

impl LaunchAgent {
    pub fn new(agents_dir: PathBuf, logs_dir: PathBuf, target: LaunchTarget) -> Self {
        Self {
            agents_dir,
            logs_dir,
            target,
            use_launchctl: true,
        }
    }

    /// Only manage the plist file, without loading it
    pub fn without_launchctl(mut self) -> Self {
        self.use_launchctl = false;
        self
    }

    pub fn label(&self) -> String {
        format!("com.{}", self.target.app_name.to_lowercase())
    }

    pub fn plist_path(&self) -> PathBuf {
        self.agents_dir.join(format!("{}.plist", self.label()))
    }

    pub fn log_path(&self) -> PathBuf {
        self.logs_dir.join(format!("{}.log", self.target.app_name))
    }

    /// Property list contents
    pub fn render(&self) -> String {
        let log_path = xml_escape(&self.log_path().display().to_string());
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{program}</string>
    </array>
    <key>WorkingDirectory</key>
    <string>{workdir}</string>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <false/>
    <key>StandardErrorPath</key>
    <string>{log}</string>
    <key>StandardOutPath</key>
    <string>{log}</string>
</dict>
</plist>
"#,
            label = xml_escape(&self.label()),
            program = xml_escape(&self.target.executable.display().to_string()),
            workdir = xml_escape(&self.target.working_dir().display().to_string()),
            log = log_path,
        )
    }

    fn launchctl(&self, verb: &str) -> Result<(), AutostartError> {
        let plist = self.plist_path().display().to_string();
        run_command("launchctl", &[verb.to_string(), "-w".to_string(), plist])
    }
}

impl AutostartManager for LaunchAgent {
    fn name(&self) -> &'static str {
        "LaunchAgent"
    }

    fn install(&self) -> Result<(), AutostartError> {
        fs::create_dir_all(&self.agents_dir)?;
        let plist = self.plist_path();

        if self.use_launchctl && plist.exists() {
            // Reinstall: the old definition may still be loaded
            if let Err(e) = self.launchctl("unload") {
                log::debug!("[Autostart] {}", e);
            }
        }

        fs::write(&plist, self.render())?;
        log::info!("[Autostart] Wrote {:?}", plist);

        if self.use_launchctl {
            if let Err(e) = self.launchctl("load") {
                fs::remove_file(&plist)?;
                return Err(e);
            }
        }
        Ok(())
    }

    fn remove(&self) -> Result<(), AutostartError> {
        let plist = self.plist_path();
        if !plist.exists() {
            log::debug!("[Autostart] {:?} not present", plist);
            return Ok(());
        }

        if self.use_launchctl {
            if let Err(e) = self.launchctl("unload") {
                log::debug!("[Autostart] {}", e);
            }
        }
        fs::remove_file(&plist)?;
        log::info!("[Autostart] Removed {:?}", plist);
        Ok(())
    }

    fn is_installed(&self) -> Result<bool, AutostartError> {
        Ok(self.plist_path().is_file())
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
