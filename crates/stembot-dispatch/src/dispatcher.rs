use crate::dance::DanceController;
use crate::keywords::{is_stop, match_command, RobotCommand};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use stembot_motion::MotionBackend;

/// What the dispatcher did with one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Stop keyword: dance cancelled, motion halted, robot stood up.
    EmergencyStop,
    /// Dance keyword with no dance running; the loop was started.
    DanceStarted,
    /// Dance keyword while the loop was already running.
    DanceAlreadyActive,
    /// A directional command ran the named action group.
    Action(&'static str),
    /// A command keyword arrived inside the cooldown and was discarded.
    Cooldown,
    /// No keyword matched.
    NoMatch,
}

/// Routes transcripts to motion commands.
///
/// Stop keywords always act immediately. All other transcripts share a
/// cooldown window: inside the window they are discarded without side
/// effects, and any transcript that passes the gate resets the clock
/// whether or not a keyword matches. The clock starts at construction so
/// a command heard during startup noise is absorbed.
pub struct CommandDispatcher {
    backend: Arc<dyn MotionBackend>,
    dance: DanceController,
    last_command: Mutex<Instant>,
    cooldown: Duration,
}

impl CommandDispatcher {
    pub fn new(
        backend: Arc<dyn MotionBackend>,
        cooldown: Duration,
        dance_interval: Duration,
    ) -> Self {
        let dance = DanceController::new(Arc::clone(&backend), dance_interval);
        Self {
            backend,
            dance,
            last_command: Mutex::new(Instant::now()),
            cooldown,
        }
    }

    pub fn dance_controller(&self) -> &DanceController {
        &self.dance
    }

    /// Handle one transcript. Motion backend failures are logged and
    /// swallowed; a flaky serial link must not take the pipeline down.
    pub async fn dispatch(&self, text: &str) -> DispatchOutcome {
        if is_stop(text) {
            return self.emergency_stop().await;
        }

        // The clock resets before keyword matching, so unmatched text
        // consumes the cooldown window too.
        {
            let mut last = self.last_command.lock().unwrap();
            if last.elapsed() < self.cooldown {
                tracing::debug!(text, "command discarded during cooldown");
                return DispatchOutcome::Cooldown;
            }
            *last = Instant::now();
        }

        let Some(command) = match_command(text) else {
            return DispatchOutcome::NoMatch;
        };

        match command {
            RobotCommand::Dance => {
                if self.dance.start().is_some() {
                    DispatchOutcome::DanceStarted
                } else {
                    tracing::debug!("dance requested but already running");
                    DispatchOutcome::DanceAlreadyActive
                }
            }
            _ => {
                let group = command
                    .action_group()
                    .expect("directional commands map to an action group");
                self.dance.stop();
                tracing::info!(group, "running action group");
                if let Err(e) = self.backend.run_action(group, 2, true).await {
                    tracing::warn!(group, error = %e, "action group failed");
                }
                DispatchOutcome::Action(group)
            }
        }
    }

    async fn emergency_stop(&self) -> DispatchOutcome {
        tracing::info!("emergency stop");
        self.dance.stop();
        if let Err(e) = self.backend.stop_all().await {
            tracing::warn!(error = %e, "stop_all failed");
        }
        if let Err(e) = self.backend.run_action("stand", 1, true).await {
            tracing::warn!(error = %e, "stand after stop failed");
        }
        *self.last_command.lock().unwrap() = Instant::now();
        DispatchOutcome::EmergencyStop
    }
}
