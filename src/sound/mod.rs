//! EthClip - Sound notification module
//!
//! Plays one of two cues when the normalization mode changes. Playback runs
//! on a detached thread and never reports back to the caller.

use std::process::Command;
use std::sync::Arc;
use std::thread;

use crate::address::NormalizationMode;

/// Sound playback error type
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Status {
        program: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("Sound unavailable: {0}")]
    Platform(String),
}

/// Cue parameters for one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    /// macOS system sound file
    pub system_sound: &'static str,
    /// Linux ALSA sample file
    pub sample: &'static str,
    /// Beep frequency (Hz)
    pub frequency: u32,
    /// Beep duration (ms)
    pub duration_ms: u32,
}

impl Cue {
    pub fn for_mode(mode: NormalizationMode) -> Self {
        match mode {
            NormalizationMode::Lowercase => Cue {
                system_sound: "/System/Library/Sounds/Purr.aiff",
                sample: "/usr/share/sounds/alsa/Front_Left.wav",
                frequency: 400,
                duration_ms: 200,
            },
            NormalizationMode::Checksum => Cue {
                system_sound: "/System/Library/Sounds/Blow.aiff",
                sample: "/usr/share/sounds/alsa/Front_Right.wav",
                frequency: 800,
                duration_ms: 200,
            },
        }
    }
}

/// Platform sound backend
pub trait SoundPlayer: Send + Sync {
    fn name(&self) -> &'static str;
    fn play(&self, mode: NormalizationMode) -> Result<(), SoundError>;
}

fn run(program: &'static str, args: &[&str]) -> Result<(), SoundError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| SoundError::Spawn { program, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(SoundError::Status { program, status })
    }
}

/// macOS system sounds through `afplay`
pub struct AfplayPlayer;

impl SoundPlayer for AfplayPlayer {
    fn name(&self) -> &'static str {
        "afplay"
    }

    fn play(&self, mode: NormalizationMode) -> Result<(), SoundError> {
        let cue = Cue::for_mode(mode);
        run(
            "afplay",
            &["-t", "1", "-v", "0.35", "-r", "1.5", cue.system_sound],
        )
    }
}

/// Windows speaker beep
pub struct BeepPlayer;

impl SoundPlayer for BeepPlayer {
    fn name(&self) -> &'static str {
        "beep"
    }

    #[cfg(windows)]
    fn play(&self, mode: NormalizationMode) -> Result<(), SoundError> {
        use windows::Win32::System::Diagnostics::Debug::Beep;

        let cue = Cue::for_mode(mode);
        unsafe { Beep(cue.frequency, cue.duration_ms) }
            .map_err(|e| SoundError::Platform(e.to_string()))
    }

    #[cfg(not(windows))]
    fn play(&self, _mode: NormalizationMode) -> Result<(), SoundError> {
        Err(SoundError::Platform("Beep is only available on Windows".to_string()))
    }
}

/// Linux playback: PulseAudio sample, then the `beep` utility, then a log line
pub struct LinuxPlayer;

impl SoundPlayer for LinuxPlayer {
    fn name(&self) -> &'static str {
        "paplay"
    }

    fn play(&self, mode: NormalizationMode) -> Result<(), SoundError> {
        let cue = Cue::for_mode(mode);
        let played = run("paplay", &[cue.sample]).or_else(|e| {
            log::debug!("[Sound] {}, falling back to beep", e);
            run(
                "beep",
                &[
                    "-f",
                    &cue.frequency.to_string(),
                    "-l",
                    &cue.duration_ms.to_string(),
                ],
            )
        });
        if let Err(e) = played {
            log::debug!("[Sound] {}", e);
            log::info!("[Sound] Sound: {}", mode);
        }
        Ok(())
    }
}

/// Log-only backend for platforms without a player
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn play(&self, mode: NormalizationMode) -> Result<(), SoundError> {
        log::info!("[Sound] Sound: {}", mode);
        Ok(())
    }
}

/// Pick the backend for an OS name as reported by `std::env::consts::OS`
pub fn player_for(os: &str) -> Arc<dyn SoundPlayer> {
    match os {
        "macos" => Arc::new(AfplayPlayer),
        "windows" => Arc::new(BeepPlayer),
        "linux" => Arc::new(LinuxPlayer),
        _ => Arc::new(SilentPlayer),
    }
}

/// Fire-and-forget mode-change notifier
#[derive(Clone)]
pub struct Notifier {
    player: Arc<dyn SoundPlayer>,
    enabled: bool,
}

impl Notifier {
    pub fn new(player: Arc<dyn SoundPlayer>, enabled: bool) -> Self {
        Self { player, enabled }
    }

    /// Notifier for the running platform
    pub fn detect(enabled: bool) -> Self {
        let player = player_for(std::env::consts::OS);
        log::debug!("[Sound] Using {} backend", player.name());
        Self::new(player, enabled)
    }

    /// Play the cue for `mode` on a detached thread
    pub fn notify(&self, mode: NormalizationMode) -> Option<thread::JoinHandle<()>> {
        if !self.enabled {
            return None;
        }
        let player = Arc::clone(&self.player);
        let spawned = thread::Builder::new()
            .name("ethclip-sound".to_string())
            .spawn(move || {
                if let Err(e) = player.play(mode) {
                    log::warn!("[Sound] Sound error: {}", e);
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("[Sound] Failed to start sound thread: {}", e);
                None
            }
        }
    }
}
