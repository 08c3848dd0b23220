pub mod capture;
pub mod device;
pub mod feedback;

pub use capture::CaptureNode;
pub use device::DeviceManager;
pub use feedback::{Notifier, NullNotifier, PlaybackNotifier};
