pub mod dance;
pub mod dispatcher;
pub mod keywords;

pub use dance::DanceController;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use keywords::{is_stop, match_command, RobotCommand};
