use async_trait::async_trait;
use stembot_core::MotionError;

/// The robot's motion executor: named action groups, an emergency halt
/// and one-time servo setup.
///
/// Implementations are registered via [`BackendRegistry`](crate::BackendRegistry).
/// An action group is a precomputed servo sequence the firmware executes
/// as one atomic gesture (e.g. `"stand"`, `"go_forward"`).
#[async_trait]
pub trait MotionBackend: Send + Sync {
    /// Returns the backend's registry name (e.g. `"board"`, `"null"`).
    fn name(&self) -> &str;
    /// One-time initialisation with backend-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), MotionError>;
    /// Run a named action group `repeat` times. With `wait` the call
    /// returns once the gesture completes; without it the gesture is
    /// dispatched and the call returns immediately.
    async fn run_action(&self, group: &str, repeat: u32, wait: bool) -> Result<(), MotionError>;
    /// Halt whatever action group is in progress.
    async fn stop_all(&self) -> Result<(), MotionError>;
    /// Move a single servo to a pulse position over `duration_ms`.
    async fn set_servo_pulse(
        &self,
        servo: u8,
        pulse: u16,
        duration_ms: u16,
    ) -> Result<(), MotionError>;
    /// Returns `true` if the backend is currently able to accept commands.
    fn is_healthy(&self) -> bool;
    /// Gracefully shut down the backend, releasing resources.
    async fn shutdown(&self) -> Result<(), MotionError>;
}
