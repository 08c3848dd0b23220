/// Keyword tables for the Norwegian voice command set, with English
/// fallbacks for each command. Matching is case-insensitive substring
/// search over the transcript; the first rule that hits wins, so the
/// rule order below is load-bearing.

/// Keywords that trigger an emergency stop. Checked before everything
/// else and never subject to the cooldown.
pub const STOP_KEYWORDS: &[&str] = &["stopp", "stop"];

/// A recognized motion command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotCommand {
    Dance,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl RobotCommand {
    /// Action group name the firmware knows this command by.
    /// `Dance` has no single group; the dance loop picks its own.
    pub fn action_group(&self) -> Option<&'static str> {
        match self {
            RobotCommand::Dance => None,
            RobotCommand::Forward => Some("go_forward"),
            RobotCommand::Backward => Some("back"),
            RobotCommand::TurnLeft => Some("turn_left"),
            RobotCommand::TurnRight => Some("turn_right"),
        }
    }
}

/// Ordered rule table. "god dag" is a greeting that doubles as a dance
/// trigger.
const RULES: &[(&[&str], RobotCommand)] = &[
    (&["dans", "dance", "god dag"], RobotCommand::Dance),
    (&["frem", "forward"], RobotCommand::Forward),
    (&["bak", "tilbake", "back"], RobotCommand::Backward),
    (&["venstre", "left"], RobotCommand::TurnLeft),
    (&["høyre", "right"], RobotCommand::TurnRight),
];

/// Returns `true` if the transcript contains a stop keyword.
pub fn is_stop(text: &str) -> bool {
    let lower = text.to_lowercase();
    STOP_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// First-match-wins keyword lookup over the rule table.
pub fn match_command(text: &str) -> Option<RobotCommand> {
    let lower = text.to_lowercase();
    for (keywords, command) in RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(*command);
        }
    }
    None
}
