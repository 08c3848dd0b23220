use std::path::PathBuf;
use std::process::{Command, Stdio};

/// One-way audio feedback to the person standing next to the robot.
pub trait Notifier: Send + Sync {
    /// Signal that the transcription pipeline is ready to take commands.
    fn ready(&self);
}

/// Plays the configured sound file by spawning the system player detached;
/// never waits for it to finish.
pub struct PlaybackNotifier {
    player: String,
    sound_path: PathBuf,
}

impl PlaybackNotifier {
    pub fn new(player: &str, sound_path: PathBuf) -> Self {
        Self {
            player: player.to_string(),
            sound_path,
        }
    }
}

impl Notifier for PlaybackNotifier {
    fn ready(&self) {
        let result = Command::new(&self.player)
            .arg(&self.sound_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match result {
            Ok(_) => tracing::debug!(player = %self.player, "ready sound playing"),
            Err(e) => tracing::warn!("failed to play ready sound: {}", e),
        }
    }
}

/// No-op notifier for tests and headless runs.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn ready(&self) {}
}
