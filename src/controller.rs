//! Session lifecycle controller.
//!
//! Owns at most one browser session and decides per capture request whether
//! to reuse or recreate it, drives the multi-viewport capture loop against
//! it, and keeps the idle accounting that the keep-alive timer reads. The
//! actor mailbox guarantees no capture run and no tick ever interleave, so
//! nothing here needs interior locking.

use std::sync::Arc;
use std::time::Duration;

use artifact_store::ObjectStore;
use browser_session::{BrowserLauncher, PageHandle, SessionError, SessionHandle};
use capture_plan::CapturePlan;
use tracing::{debug, error, info, warn};

use crate::config::CaptureSettings;
use crate::errors::CaptureError;
use crate::metrics;

/// Outcome of one keep-alive tick, telling the driver whether another tick
/// was armed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Still under the idle budget; one more tick is pending.
    Rearmed,
    /// Idle budget reached; the session (if any) was closed and no timer is
    /// pending.
    Closed,
}

pub struct SessionLifecycleController {
    launcher: Box<dyn BrowserLauncher>,
    store: Arc<dyn ObjectStore>,
    settings: CaptureSettings,
    session: Option<Box<dyn SessionHandle>>,
    idle_seconds: u64,
    timer_armed: bool,
}

impl SessionLifecycleController {
    pub fn new(
        launcher: Box<dyn BrowserLauncher>,
        store: Arc<dyn ObjectStore>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            launcher,
            store,
            settings,
            session: None,
            idle_seconds: 0,
            timer_armed: false,
        }
    }

    pub fn idle_tick(&self) -> Duration {
        self.settings.idle_tick()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Runs one validated plan to completion: ensures a live session,
    /// captures every target in order, and resets the idle clock on success.
    pub async fn handle_capture(&mut self, plan: &CapturePlan) -> Result<(), CaptureError> {
        self.ensure_session().await?;
        let result = self.run_capture(plan).await;
        match &result {
            Ok(()) => {
                self.idle_seconds = 0;
                metrics::record_capture_run();
            }
            Err(err) => {
                error!(%err, url = %plan.canonical_url, "capture run failed");
                metrics::record_capture_failure();
            }
        }
        result
    }

    /// Arms the keep-alive timer unless one is already pending. Returns true
    /// when the caller must schedule exactly one tick.
    pub fn arm_timer(&mut self) -> bool {
        if self.timer_armed {
            return false;
        }
        self.timer_armed = true;
        debug!("keep-alive timer armed");
        true
    }

    /// One keep-alive tick: extends the session's life while recent capture
    /// activity keeps the idle clock under budget, tears it down otherwise.
    pub async fn on_idle_tick(&mut self) -> TickOutcome {
        self.timer_armed = false;
        self.idle_seconds = self
            .idle_seconds
            .saturating_add(self.settings.idle_tick_secs);

        if self.idle_seconds < self.settings.keep_alive_budget_secs {
            debug!(
                idle_seconds = self.idle_seconds,
                "session kept alive, extending lifespan"
            );
            self.timer_armed = true;
            return TickOutcome::Rearmed;
        }

        info!(
            idle_seconds = self.idle_seconds,
            budget_secs = self.settings.keep_alive_budget_secs,
            "idle budget exceeded, retiring session"
        );
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.close().await {
                warn!(%err, "session close failed");
            }
            metrics::record_session_closed();
        }
        TickOutcome::Closed
    }

    /// Reuses the current session when it is still connected; otherwise
    /// discards the dead handle (no explicit close, the connection is
    /// already gone) and launches a fresh one. Entering the active state
    /// resets the idle clock.
    async fn ensure_session(&mut self) -> Result<(), CaptureError> {
        let connected = self
            .session
            .as_ref()
            .map(|session| session.is_connected())
            .unwrap_or(false);

        if !connected {
            if self.session.take().is_some() {
                info!("discarding disconnected browser session");
            }
            info!("starting new browser session");
            match self.launcher.launch().await {
                Ok(session) => {
                    self.session = Some(session);
                    metrics::record_session_launched();
                }
                Err(err) => {
                    error!(%err, "could not start browser session");
                    return Err(CaptureError::SessionLaunch(err));
                }
            }
        }

        self.idle_seconds = 0;
        Ok(())
    }

    /// One page for the whole run; per target: viewport, navigate, shoot,
    /// store. Fail-fast: the first failing step aborts the remaining targets
    /// and artifacts already written stay where they are.
    async fn run_capture(&mut self, plan: &CapturePlan) -> Result<(), CaptureError> {
        let session = self.session.as_ref().ok_or_else(|| {
            CaptureError::SessionLaunch(SessionError::Launch("no usable session".to_string()))
        })?;
        let page = session.new_page().await.map_err(CaptureError::PageOpen)?;

        let result = self.capture_targets(page.as_ref(), plan).await;
        // the page is released whether the run succeeded or aborted mid-loop
        if let Err(err) = page.close().await {
            warn!(%err, "page close failed after capture run");
        }
        result
    }

    async fn capture_targets(
        &self,
        page: &dyn PageHandle,
        plan: &CapturePlan,
    ) -> Result<(), CaptureError> {
        for target in &plan.targets {
            page.set_viewport(target.width, target.height)
                .await
                .map_err(|err| CaptureError::step(*target, err))?;
            page.goto(&plan.canonical_url)
                .await
                .map_err(|err| CaptureError::step(*target, err))?;
            let shot = page
                .screenshot()
                .await
                .map_err(|err| CaptureError::step(*target, err))?;

            let key = plan.key_for(target);
            self.store
                .put(&key, &shot)
                .await
                .map_err(|source| CaptureError::Storage {
                    key: key.clone(),
                    source,
                })?;
            metrics::record_artifact_stored();
            debug!(key, width = target.width, height = target.height, "artifact stored");
        }
        Ok(())
    }
}
