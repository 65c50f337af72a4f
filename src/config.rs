//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hubd/config.json`.
//! Sections are keyed by name so the file can grow new sections later
//! without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "notifications": {
//!     "poll_interval_ms": 1500,
//!     "max_visible": 6,
//!     "history_command": "makoctl history",
//!     "dismiss_command": "makoctl dismiss -n",
//!     "dismissed_path": "/home/me/.cache/ags-hub-dismissed.json",
//!     "dnd_interval_ms": 1500,
//!     "mode_command": "makoctl mode",
//!     "dnd_toggle_command": "makoctl mode -t do-not-disturb"
//!   },
//!   "stats": { "cpu_interval_ms": 2000, "ram_interval_ms": 3000 },
//!   "status": {
//!     "volume_command": "pactl get-sink-volume @DEFAULT_SINK@",
//!     "volume_interval_ms": 350,
//!     "brightness_command": "brightnessctl -m",
//!     "brightness_interval_ms": 500,
//!     "events_command": "khal list now 1h --json title --json start-time",
//!     "events_interval_ms": 60000,
//!     "weather_command": "\"$HOME/.config/ags/script/weather.sh\"",
//!     "weather_interval_ms": 90000
//!   }
//! }
//! ```

use crate::linux::mako::{
    DEFAULT_DISMISS_COMMAND, DEFAULT_DND_TOGGLE_COMMAND, DEFAULT_HISTORY_COMMAND,
    DEFAULT_MODE_COMMAND,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the dismissal cache inside the user cache directory.
pub const DISMISSED_FILE_NAME: &str = "ags-hub-dismissed.json";

/// Where the weather script caches its last reading, relative to `$HOME`.
pub const WEATHER_CACHE_FILE: &str = ".config/ags/.cache/ags-weather.json";

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Notification list settings.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// CPU / RAM chip settings.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Volume, brightness, calendar and weather readers.
    #[serde(default)]
    pub status: StatusConfig,
}

/// Notification list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How often the daemon history is re-read (ms).
    pub poll_interval_ms: u64,
    /// Maximum number of notifications shown in the panel.
    pub max_visible: usize,
    /// Shell command printing the daemon's history.
    pub history_command: String,
    /// Shell command dismissing one notification; the id is appended.
    pub dismiss_command: String,
    /// Where the dismissal cache lives.  `None` means
    /// `$XDG_CACHE_HOME/ags-hub-dismissed.json`.
    pub dismissed_path: Option<PathBuf>,
    /// How often the do-not-disturb state is re-read (ms).
    pub dnd_interval_ms: u64,
    /// Shell command listing the daemon's active modes.
    pub mode_command: String,
    /// Shell command toggling do-not-disturb.
    pub dnd_toggle_command: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1500,
            max_visible: 6,
            history_command: DEFAULT_HISTORY_COMMAND.into(),
            dismiss_command: DEFAULT_DISMISS_COMMAND.into(),
            dismissed_path: None,
            dnd_interval_ms: 1500,
            mode_command: DEFAULT_MODE_COMMAND.into(),
            dnd_toggle_command: DEFAULT_DND_TOGGLE_COMMAND.into(),
        }
    }
}

impl NotificationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The configured cache path, or the default under the user cache dir.
    pub fn dismissed_path(&self) -> PathBuf {
        self.dismissed_path
            .clone()
            .unwrap_or_else(|| cache_dir().join(DISMISSED_FILE_NAME))
    }
}

/// CPU / RAM polling intervals.  All durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub cpu_interval_ms: u64,
    pub ram_interval_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            cpu_interval_ms: 2000,
            ram_interval_ms: 3000,
        }
    }
}

/// Shell commands and intervals for the status chips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub volume_command: String,
    pub volume_interval_ms: u64,
    pub brightness_command: String,
    pub brightness_interval_ms: u64,
    pub events_command: String,
    pub events_interval_ms: u64,
    /// Script printing `{"temp":..,"icon":..,"desc":..}`.
    pub weather_command: String,
    pub weather_interval_ms: u64,
    /// The script's cache, shown until its first run completes.  `None`
    /// means `$HOME/.config/ags/.cache/ags-weather.json`.
    pub weather_cache_path: Option<PathBuf>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            volume_command: "pactl get-sink-volume @DEFAULT_SINK@".into(),
            volume_interval_ms: 350,
            brightness_command: "brightnessctl -m".into(),
            brightness_interval_ms: 500,
            events_command: "khal list now 1h --json title --json start-time".into(),
            events_interval_ms: 60_000,
            weather_command: "\"$HOME/.config/ags/script/weather.sh\"".into(),
            weather_interval_ms: 90_000,
            weather_cache_path: None,
        }
    }
}

impl StatusConfig {
    pub fn weather_cache_path(&self) -> PathBuf {
        self.weather_cache_path
            .clone()
            .unwrap_or_else(|| home_dir().join(WEATHER_CACHE_FILE))
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

/// `$XDG_CACHE_HOME`, falling back to `$HOME/.cache`.
pub fn cache_dir() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

/// `$XDG_CONFIG_HOME/hubd`, falling back to `$HOME/.config/hubd`.
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("hubd")
}

/// Default control socket path (`$XDG_RUNTIME_DIR/hubd.sock`).
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hubd.sock")
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    match std::env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(home_fallback),
    }
}
