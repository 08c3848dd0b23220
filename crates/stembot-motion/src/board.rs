use crate::backend_trait::MotionBackend;
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use stembot_core::MotionError;

/// Poll interval for the serial read while waiting for an acknowledgement.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Vendor controller board reached over a serial port.
///
/// The on-board action-group runner consumes line commands:
/// `RUN <group> <repeat>`, `STOP`, `SERVO <id> <pulse> <ms>`. A blocking
/// run waits for the runner's `DONE` line; everything else is
/// fire-and-forget. All serial I/O happens under `spawn_blocking` so the
/// async runtime is never stalled by the wire.
pub struct BoardBackend {
    port: Arc<Mutex<Option<Box<dyn SerialPort>>>>,
    reply_timeout: Duration,
}

impl BoardBackend {
    pub fn new() -> Self {
        Self {
            port: Arc::new(Mutex::new(None)),
            reply_timeout: Duration::from_millis(10000),
        }
    }

    async fn send(&self, command: String, wait_for_done: bool) -> Result<(), MotionError> {
        let port = Arc::clone(&self.port);
        let deadline = self.reply_timeout;

        tokio::task::spawn_blocking(move || {
            let mut guard = port
                .lock()
                .map_err(|_| MotionError::CommandFailed("failed to lock serial port".to_string()))?;
            let port = guard
                .as_mut()
                .ok_or_else(|| MotionError::CommandFailed("not initialized".to_string()))?;

            port.write_all(command.as_bytes())
                .map_err(|e| MotionError::CommandFailed(format!("serial write failed: {}", e)))?;

            if wait_for_done {
                wait_for_ack(port.as_mut(), deadline)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| MotionError::CommandFailed(format!("serial task panicked: {}", e)))?
    }
}

/// Read until the runner reports `DONE`, or fail at the deadline.
fn wait_for_ack(port: &mut dyn SerialPort, deadline: Duration) -> Result<(), MotionError> {
    let start = Instant::now();
    let mut line = String::new();
    let mut byte = [0u8; 1];

    while start.elapsed() < deadline {
        match port.read(&mut byte) {
            Ok(1) => {
                if byte[0] == b'\n' {
                    if line.trim() == "DONE" {
                        return Ok(());
                    }
                    line.clear();
                } else {
                    line.push(byte[0] as char);
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                return Err(MotionError::CommandFailed(format!(
                    "serial read failed: {}",
                    e
                )))
            }
        }
    }

    Err(MotionError::CommandFailed(
        "timed out waiting for board acknowledgement".to_string(),
    ))
}

impl Default for BoardBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionBackend for BoardBackend {
    fn name(&self) -> &str {
        "board"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), MotionError> {
        let path = config
            .get("port")
            .and_then(|v| v.as_str())
            .unwrap_or("/dev/ttyAMA0")
            .to_string();
        let baud = config
            .get("baud")
            .and_then(|v| v.as_integer())
            .unwrap_or(115200) as u32;
        if let Some(ms) = config.get("reply_timeout_ms").and_then(|v| v.as_integer()) {
            self.reply_timeout = Duration::from_millis(ms as u64);
        }

        let port = serialport::new(&path, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| {
                MotionError::InitializationFailed(format!("failed to open {}: {}", path, e))
            })?;

        tracing::info!(port = %path, baud, "board backend connected");
        *self.port.lock().unwrap() = Some(port);
        Ok(())
    }

    async fn run_action(&self, group: &str, repeat: u32, wait: bool) -> Result<(), MotionError> {
        tracing::debug!(group = %group, repeat, wait, "run action group");
        self.send(format!("RUN {} {}\n", group, repeat), wait).await
    }

    async fn stop_all(&self) -> Result<(), MotionError> {
        tracing::debug!("halting action group");
        self.send("STOP\n".to_string(), false).await
    }

    async fn set_servo_pulse(
        &self,
        servo: u8,
        pulse: u16,
        duration_ms: u16,
    ) -> Result<(), MotionError> {
        self.send(format!("SERVO {} {} {}\n", servo, pulse, duration_ms), false)
            .await
    }

    fn is_healthy(&self) -> bool {
        self.port.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    async fn shutdown(&self) -> Result<(), MotionError> {
        *self
            .port
            .lock()
            .map_err(|_| MotionError::CommandFailed("failed to lock serial port".to_string()))? =
            None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_config(port: &str) -> toml::Value {
        toml::Value::Table({
            let mut t = toml::map::Map::new();
            t.insert("port".to_string(), toml::Value::String(port.to_string()));
            t
        })
    }

    #[test]
    fn test_board_backend_name() {
        let backend = BoardBackend::new();
        assert_eq!(backend.name(), "board");
    }

    #[test]
    fn test_board_backend_unhealthy_before_init() {
        let backend = BoardBackend::new();
        assert!(!backend.is_healthy());
    }

    #[tokio::test]
    async fn test_board_backend_initialize_bad_port_fails() {
        let mut backend = BoardBackend::new();
        let result = backend
            .initialize(board_config("/dev/definitely-not-a-port-12345"))
            .await;
        match result {
            Err(MotionError::InitializationFailed(msg)) => {
                assert!(msg.contains("definitely-not-a-port-12345"));
            }
            _ => panic!("expected InitializationFailed"),
        }
    }

    #[tokio::test]
    async fn test_board_backend_command_before_init_fails() {
        let backend = BoardBackend::new();
        let result = backend.run_action("stand", 1, false).await;
        match result {
            Err(MotionError::CommandFailed(msg)) => {
                assert!(msg.contains("not initialized"));
            }
            _ => panic!("expected CommandFailed"),
        }
    }

    #[tokio::test]
    async fn test_board_backend_shutdown_without_init_succeeds() {
        let backend = BoardBackend::new();
        assert!(backend.shutdown().await.is_ok());
    }

    #[test]
    fn test_board_backend_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoardBackend>();
    }
}
