use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::dispatch::AppTable;
use crate::motion::DEFAULT_COOLDOWN_TICKS;

const DEFAULT_CAMERA_INDEX: u32 = 0;
const DEFAULT_LISTEN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_TICK_INTERVAL_MS: u64 = 33;
const DEFAULT_TTS_PROGRAM: &str = "espeak";
const DEFAULT_DETECTOR_BACKEND: &str = "none";

/// On-disk shape: everything optional, defaults filled in by `Settings`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    camera_index: Option<u32>,
    gesture_cooldown_ticks: Option<u32>,
    listen_timeout_secs: Option<u64>,
    tick_interval_ms: Option<u64>,
    speak_back: Option<bool>,
    tts_program: Option<String>,
    stt_program: Option<String>,
    detector_backend: Option<String>,
    #[serde(default)]
    applications: HashMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub camera_index: u32,
    pub gesture_cooldown_ticks: u32,
    pub listen_timeout: Duration,
    pub tick_interval: Duration,
    pub speak_back: bool,
    pub tts_program: String,
    /// External recognizer command; `None` disables voice mode.
    pub stt_program: Option<String>,
    pub detector_backend: String,
    pub applications: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            gesture_cooldown_ticks: DEFAULT_COOLDOWN_TICKS,
            listen_timeout: Duration::from_secs(DEFAULT_LISTEN_TIMEOUT_SECS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            speak_back: true,
            tts_program: DEFAULT_TTS_PROGRAM.to_string(),
            stt_program: None,
            detector_backend: DEFAULT_DETECTOR_BACKEND.to_string(),
            applications: default_applications(),
        }
    }
}

impl Settings {
    /// Load from an optional TOML file, then apply environment overrides and
    /// validate. A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };
        let mut settings = Self::from_file(file);
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        let mut applications = defaults.applications;
        // File entries extend and override the built-in table.
        applications.extend(file.applications);

        Self {
            camera_index: file.camera_index.unwrap_or(defaults.camera_index),
            gesture_cooldown_ticks: file
                .gesture_cooldown_ticks
                .unwrap_or(defaults.gesture_cooldown_ticks),
            listen_timeout: file
                .listen_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.listen_timeout),
            tick_interval: file
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            speak_back: file.speak_back.unwrap_or(defaults.speak_back),
            tts_program: file.tts_program.unwrap_or(defaults.tts_program),
            stt_program: file.stt_program,
            detector_backend: file.detector_backend.unwrap_or(defaults.detector_backend),
            applications,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("DESKWAVE_CAMERA_INDEX") {
            self.camera_index = value
                .parse()
                .context("DESKWAVE_CAMERA_INDEX is not a number")?;
        }
        if let Ok(value) = std::env::var("DESKWAVE_LISTEN_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .context("DESKWAVE_LISTEN_TIMEOUT_SECS is not a number")?;
            self.listen_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(anyhow!("tick_interval_ms must be positive"));
        }
        if self.listen_timeout.is_zero() {
            return Err(anyhow!("listen_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn app_table(&self) -> AppTable {
        AppTable::new(self.applications.clone())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn default_applications() -> HashMap<String, String> {
    [
        ("notepad", "notepad.exe"),
        ("calculator", "calc.exe"),
        ("paint", "mspaint.exe"),
        ("browser", "chrome.exe"),
        ("chrome", "chrome.exe"),
        ("discord", "discord"),
        ("telegram", "telegram-desktop"),
        ("zoom", "zoom"),
        ("files", "nautilus"),
        ("terminal", "x-terminal-emulator"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect()
}
