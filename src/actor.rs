//! Per-subject capture actor.
//!
//! One actor per sanitized URL owns a [`SessionLifecycleController`] and
//! serializes everything that touches it through a single mailbox: capture
//! requests from the HTTP layer and keep-alive ticks from the timer task.
//! Because both arrive on the same channel, a capture landing between two
//! ticks deterministically resets the idle clock before the next tick reads
//! it.

use capture_plan::CapturePlan;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::controller::{SessionLifecycleController, TickOutcome};
use crate::errors::CaptureError;

const MAILBOX_DEPTH: usize = 32;

enum Command {
    Capture {
        plan: CapturePlan,
        reply: oneshot::Sender<Result<(), CaptureError>>,
    },
    IdleTick,
}

/// Cheap clonable handle to one actor's mailbox.
#[derive(Clone)]
pub struct ActorHandle {
    tx: mpsc::Sender<Command>,
}

impl ActorHandle {
    /// Runs one plan on the actor and waits for the result.
    pub async fn capture(&self, plan: CapturePlan) -> Result<(), CaptureError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Capture { plan, reply })
            .await
            .map_err(|_| CaptureError::ActorUnavailable)?;
        response.await.map_err(|_| CaptureError::ActorUnavailable)?
    }
}

/// Spawns the actor task for one subject and returns its handle.
pub fn spawn(subject: String, controller: SessionLifecycleController) -> ActorHandle {
    let (tx, rx) = mpsc::channel(MAILBOX_DEPTH);
    tokio::spawn(run(subject, controller, tx.clone(), rx));
    ActorHandle { tx }
}

async fn run(
    subject: String,
    mut controller: SessionLifecycleController,
    tx: mpsc::Sender<Command>,
    mut rx: mpsc::Receiver<Command>,
) {
    debug!(subject, "capture actor started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Capture { plan, reply } => {
                let result = controller.handle_capture(&plan).await;
                // A session now exists (or survived); make sure exactly one
                // tick is in flight to eventually retire it.
                if controller.has_session() && controller.arm_timer() {
                    schedule_tick(&tx, &controller);
                }
                if reply.send(result).is_err() {
                    warn!(subject, "capture requester went away before the reply");
                }
            }
            Command::IdleTick => {
                if controller.on_idle_tick().await == TickOutcome::Rearmed {
                    schedule_tick(&tx, &controller);
                }
            }
        }
    }
    debug!(subject, "capture actor stopped");
}

/// Delivers one `IdleTick` after the configured tick length. The send fails
/// only when the actor is gone, which makes the tick moot.
fn schedule_tick(tx: &mpsc::Sender<Command>, controller: &SessionLifecycleController) {
    let tx = tx.clone();
    let tick = controller.idle_tick();
    tokio::spawn(async move {
        sleep(tick).await;
        let _ = tx.send(Command::IdleTick).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureSettings;
    use crate::testkit::FakeLauncher;
    use artifact_store::MemoryObjectStore;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn plan() -> CapturePlan {
        let now = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("valid timestamp");
        CapturePlan::build("https://example.com", now).expect("valid url")
    }

    fn spawn_actor(launcher: FakeLauncher, store: Arc<MemoryObjectStore>) -> ActorHandle {
        let controller = SessionLifecycleController::new(
            Box::new(launcher),
            store,
            CaptureSettings::default(),
        );
        spawn("https___example_com".to_string(), controller)
    }

    #[tokio::test]
    async fn capture_through_the_mailbox_stores_five_artifacts() {
        let store = Arc::new(MemoryObjectStore::new());
        let handle = spawn_actor(FakeLauncher::new(), store.clone());

        handle.capture(plan()).await.unwrap();

        assert_eq!(store.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_is_torn_down_after_the_budget() {
        let launcher = FakeLauncher::new();
        let sessions = launcher.sessions.clone();
        let handle = spawn_actor(launcher, Arc::new(MemoryObjectStore::new()));

        handle.capture(plan()).await.unwrap();

        // ticks land at 10s intervals; the sixth one crosses the 60s budget
        tokio::time::sleep(Duration::from_secs(70)).await;

        assert_eq!(sessions.lock()[0].closes.load(Ordering::SeqCst), 1);
        assert!(!sessions.lock()[0].connected.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn capture_between_ticks_extends_the_session() {
        let launcher = FakeLauncher::new();
        let launches = launcher.launches.clone();
        let sessions = launcher.sessions.clone();
        let handle = spawn_actor(launcher, Arc::new(MemoryObjectStore::new()));

        handle.capture(plan()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(45)).await;

        // still alive; this capture reuses the session and resets the clock
        handle.capture(plan()).await.unwrap();
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(sessions.lock()[0].closes.load(Ordering::SeqCst), 0);

        // no further activity: the budget runs out
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sessions.lock()[0].closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validation_never_reaches_the_actor() {
        // plans are validated before they are sent; the mailbox only ever
        // sees well-formed plans, so a bad URL fails at build time
        let err = CapturePlan::build("ftp://example.com", Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "URL must start with http or https");
    }
}
