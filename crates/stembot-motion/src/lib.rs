pub mod backend_trait;
pub mod board;
pub mod null_backend;
pub mod registry;
pub mod servo;

pub use backend_trait::MotionBackend;
pub use board::BoardBackend;
pub use null_backend::{MotionCall, NullBackend};
pub use registry::BackendRegistry;
pub use servo::ServoTrim;
