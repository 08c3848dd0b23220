use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub asr: AsrConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub robot: RobotConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Sound file played once the transcription worker is ready.
    #[serde(default)]
    pub ready_sound: Option<PathBuf>,

    #[serde(default = "default_player")]
    pub player: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            ready_sound: None,
            player: default_player(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AsrConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default)]
    pub whisper: Option<WhisperConfig>,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            whisper: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WhisperConfig {
    pub model_path: String,

    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Length of the independent transcription window, in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: f32,

    #[serde(default = "default_dance_interval_ms")]
    pub dance_interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            window_secs: default_window_secs(),
            dance_interval_ms: default_dance_interval_ms(),
        }
    }
}

impl DispatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn dance_interval(&self) -> Duration {
        Duration::from_millis(self.dance_interval_ms)
    }

    pub fn window_samples(&self, sample_rate: u32) -> usize {
        (self.window_secs * sample_rate as f32) as usize
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RobotConfig {
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Persisted servo trim file (vendor YAML format), applied once at startup.
    #[serde(default)]
    pub servo_file: Option<PathBuf>,

    #[serde(default)]
    pub board: Option<BoardConfig>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            servo_file: None,
            board: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoardConfig {
    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_baud")]
    pub baud: u32,

    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_buffer_size() -> u32 {
    1024
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_player() -> String {
    "aplay".to_string()
}

fn default_engine() -> String {
    "whisper".to_string()
}

fn default_language() -> String {
    "no".to_string()
}

fn default_cooldown_ms() -> u64 {
    1500
}

fn default_window_secs() -> f32 {
    2.0
}

fn default_dance_interval_ms() -> u64 {
    50
}

fn default_backend() -> String {
    "board".to_string()
}

fn default_port() -> String {
    "/dev/ttyAMA0".to_string()
}

fn default_baud() -> u32 {
    115200
}

fn default_reply_timeout_ms() -> u64 {
    10000
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}
