use crate::backend_trait::MotionBackend;
use std::collections::HashMap;
use stembot_core::MotionError;

pub struct BackendRegistry {
    factories: HashMap<String, fn() -> Box<dyn MotionBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("null", || Box::new(crate::null_backend::NullBackend::new()));
        registry.register("board", || Box::new(crate::board::BoardBackend::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn MotionBackend>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn MotionBackend>, MotionError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| MotionError::BackendNotFound(name.to_string()))
    }

    pub fn list_backends(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
