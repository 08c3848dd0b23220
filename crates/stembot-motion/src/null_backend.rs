use crate::backend_trait::MotionBackend;
use async_trait::async_trait;
use std::sync::Mutex;
use stembot_core::MotionError;

/// One recorded invocation on the [`NullBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionCall {
    RunAction {
        group: String,
        repeat: u32,
        wait: bool,
    },
    StopAll,
    SetServoPulse {
        servo: u8,
        pulse: u16,
        duration_ms: u16,
    },
}

/// Test double: records every call in order and always succeeds.
pub struct NullBackend {
    calls: Mutex<Vec<MotionCall>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MotionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: MotionCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), MotionError> {
        Ok(())
    }

    async fn run_action(&self, group: &str, repeat: u32, wait: bool) -> Result<(), MotionError> {
        tracing::trace!(group = %group, repeat, wait, "NullBackend run_action");
        self.record(MotionCall::RunAction {
            group: group.to_string(),
            repeat,
            wait,
        });
        Ok(())
    }

    async fn stop_all(&self) -> Result<(), MotionError> {
        self.record(MotionCall::StopAll);
        Ok(())
    }

    async fn set_servo_pulse(
        &self,
        servo: u8,
        pulse: u16,
        duration_ms: u16,
    ) -> Result<(), MotionError> {
        self.record(MotionCall::SetServoPulse {
            servo,
            pulse,
            duration_ms,
        });
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }

    async fn shutdown(&self) -> Result<(), MotionError> {
        Ok(())
    }
}
