pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AsrError, AudioError, ConfigError, MotionError};
pub use types::{AudioChunk, Transcript};
