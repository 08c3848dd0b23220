use serde::Deserialize;
use std::path::Path;
use stembot_core::MotionError;

/// Persisted per-robot servo trim, written by the vendor's calibration
/// tool in YAML. Read once at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServoTrim {
    #[serde(default = "default_pulse")]
    pub servo1: u16,

    #[serde(default = "default_pulse")]
    pub servo2: u16,
}

fn default_pulse() -> u16 {
    1500
}

impl Default for ServoTrim {
    fn default() -> Self {
        Self {
            servo1: default_pulse(),
            servo2: default_pulse(),
        }
    }
}

impl ServoTrim {
    pub fn load_from_file(path: &Path) -> Result<Self, MotionError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MotionError::ServoTrimRead(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, MotionError> {
        serde_yaml::from_str(s).map_err(|e| MotionError::ServoTrimRead(e.to_string()))
    }
}
