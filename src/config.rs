//! Application-level configuration loading, including the game-rule toggles
//! that vary between deployments.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SONG_SLEUTH_CONFIG_PATH";

/// Default length of generated room codes.
const DEFAULT_ROOM_CODE_LENGTH: usize = 6;
/// Default interval between housekeeping sweeps of finished rooms.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 900;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// When true the DJ also submits a song and is counted by the
    /// all-submitted check; votes always exclude the DJ regardless.
    pub dj_submits_song: bool,
    /// When true, all-submitted/all-voted are evaluated against the roster
    /// snapshot taken when the game was created rather than the live room
    /// roster.
    pub late_joiners_exempt: bool,
    /// Number of characters in generated room codes.
    pub room_code_length: usize,
    /// Interval between housekeeping sweeps.
    pub sweep_interval: Duration,
    /// When true the sweeper removes every room regardless of status
    /// (the full-wipe variant), instead of only finished rooms.
    pub sweep_all_rooms: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), ?config, "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dj_submits_song: false,
            late_joiners_exempt: true,
            room_code_length: DEFAULT_ROOM_CODE_LENGTH,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            sweep_all_rooms: false,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    dj_submits_song: Option<bool>,
    #[serde(default)]
    late_joiners_exempt: Option<bool>,
    #[serde(default)]
    room_code_length: Option<usize>,
    #[serde(default)]
    sweep_interval_secs: Option<u64>,
    #[serde(default)]
    sweep_all_rooms: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            dj_submits_song: raw.dj_submits_song.unwrap_or(defaults.dj_submits_song),
            late_joiners_exempt: raw
                .late_joiners_exempt
                .unwrap_or(defaults.late_joiners_exempt),
            room_code_length: raw
                .room_code_length
                .filter(|len| *len >= 4)
                .unwrap_or(defaults.room_code_length),
            sweep_interval: raw
                .sweep_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            sweep_all_rooms: raw.sweep_all_rooms.unwrap_or(defaults.sweep_all_rooms),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
