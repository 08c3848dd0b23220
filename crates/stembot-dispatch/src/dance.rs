use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stembot_motion::MotionBackend;
use tokio::task::JoinHandle;

/// Action groups the dance loop picks from.
const DANCE_GROUPS: &[&str] = &["dance1", "dance2", "dance3", "dance4"];

/// Owns the background dance loop and its cancellation flag.
///
/// Starting is idempotent: a compare-and-swap on the active flag makes
/// sure only one loop runs at a time. Stopping is cooperative; the loop
/// observes the cleared flag at its next iteration.
pub struct DanceController {
    backend: Arc<dyn MotionBackend>,
    active: Arc<AtomicBool>,
    interval: Duration,
}

impl DanceController {
    pub fn new(backend: Arc<dyn MotionBackend>, interval: Duration) -> Self {
        Self {
            backend,
            active: Arc::new(AtomicBool::new(false)),
            interval,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start the dance loop. Returns `None` if one is already running.
    ///
    /// Each iteration dispatches one randomly chosen dance group without
    /// waiting for it to finish, so a stop request can cut the gesture
    /// short.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let backend = Arc::clone(&self.backend);
        let active = Arc::clone(&self.active);
        let interval = self.interval;

        Some(tokio::spawn(async move {
            tracing::info!("dance loop started");
            while active.load(Ordering::SeqCst) {
                let group = *DANCE_GROUPS
                    .choose(&mut rand::thread_rng())
                    .expect("dance group table is non-empty");
                if let Err(e) = backend.run_action(group, 1, false).await {
                    tracing::warn!(group, error = %e, "dance step failed");
                }
                tokio::time::sleep(interval).await;
            }
            tracing::info!("dance loop stopped");
        }))
    }

    /// Signal the dance loop to stop. Safe to call when no loop runs.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stembot_motion::{MotionCall, NullBackend};

    fn controller_with_null() -> (DanceController, Arc<NullBackend>) {
        let backend = Arc::new(NullBackend::new());
        let controller = DanceController::new(
            Arc::clone(&backend) as Arc<dyn MotionBackend>,
            Duration::from_millis(5),
        );
        (controller, backend)
    }

    #[tokio::test]
    async fn test_dance_start_sets_active() {
        let (controller, _backend) = controller_with_null();
        assert!(!controller.is_active());

        let handle = controller.start().expect("first start should spawn");
        assert!(controller.is_active());

        controller.stop();
        handle.await.unwrap();
        assert!(!controller.is_active());
    }

    #[tokio::test]
    async fn test_dance_second_start_is_refused() {
        let (controller, _backend) = controller_with_null();
        let handle = controller.start().expect("first start should spawn");
        assert!(controller.start().is_none());

        controller.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dance_loop_issues_non_blocking_steps() {
        let (controller, backend) = controller_with_null();
        let handle = controller.start().unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        controller.stop();
        handle.await.unwrap();

        let calls = backend.calls();
        assert!(!calls.is_empty());
        for call in calls {
            match call {
                MotionCall::RunAction { group, repeat, wait } => {
                    assert!(DANCE_GROUPS.contains(&group.as_str()));
                    assert_eq!(repeat, 1);
                    assert!(!wait);
                }
                other => panic!("unexpected call: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_dance_stop_without_start_is_noop() {
        let (controller, backend) = controller_with_null();
        controller.stop();
        assert!(!controller.is_active());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dance_restart_after_stop() {
        let (controller, _backend) = controller_with_null();

        let handle = controller.start().unwrap();
        controller.stop();
        handle.await.unwrap();

        let handle = controller.start().expect("restart should spawn");
        assert!(controller.is_active());
        controller.stop();
        handle.await.unwrap();
    }
}
