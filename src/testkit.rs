//! Counting fakes shared by the controller, actor and server tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use artifact_store::{ObjectStore, StoreError};
use async_trait::async_trait;
use browser_session::{BrowserLauncher, PageHandle, SessionError, SessionHandle};
use parking_lot::Mutex;

use crate::registry::LauncherFactory;

/// Per-session observability: the launcher keeps one of these for every
/// session it handed out, so tests can flip liveness and count closes after
/// the handle itself moved into the controller.
#[derive(Default)]
pub(crate) struct FakeSessionState {
    pub connected: AtomicBool,
    pub closes: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct FakeLauncher {
    pub launches: Arc<AtomicUsize>,
    pub fail_launch: Arc<AtomicBool>,
    pub sessions: Arc<Mutex<Vec<Arc<FakeSessionState>>>>,
    shots: Arc<AtomicUsize>,
    /// 1-based index of the screenshot that fails; 0 disables.
    fail_shot_at: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`th screenshot (counted across all pages) fail.
    pub fn fail_screenshot_at(&self, n: usize) {
        self.fail_shot_at.store(n, Ordering::SeqCst);
    }

    pub fn shots(&self) -> usize {
        self.shots.load(Ordering::SeqCst)
    }

    /// Wraps this launcher in a registry factory; every actor gets a clone
    /// sharing the same counters.
    pub fn factory(&self) -> LauncherFactory {
        let launcher = self.clone();
        Arc::new(move || Box::new(launcher.clone()))
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn SessionHandle>, SessionError> {
        // counts attempts, including refused ones
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(SessionError::Launch("fake launch refused".to_string()));
        }
        let state = Arc::new(FakeSessionState {
            connected: AtomicBool::new(true),
            closes: AtomicUsize::new(0),
        });
        self.sessions.lock().push(state.clone());
        Ok(Box::new(FakeSession {
            state,
            shots: self.shots.clone(),
            fail_shot_at: self.fail_shot_at.clone(),
        }))
    }
}

pub(crate) struct FakeSession {
    state: Arc<FakeSessionState>,
    shots: Arc<AtomicUsize>,
    fail_shot_at: Arc<AtomicUsize>,
}

#[async_trait]
impl SessionHandle for FakeSession {
    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    async fn new_page(&self) -> Result<Box<dyn PageHandle>, SessionError> {
        Ok(Box::new(FakePage {
            shots: self.shots.clone(),
            fail_shot_at: self.fail_shot_at.clone(),
        }))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.state.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FakePage {
    shots: Arc<AtomicUsize>,
    fail_shot_at: Arc<AtomicUsize>,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn set_viewport(&self, _width: u32, _height: u32) -> Result<(), SessionError> {
        Ok(())
    }

    async fn goto(&self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError> {
        let shot = self.shots.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_at = self.fail_shot_at.load(Ordering::SeqCst);
        if fail_at != 0 && shot == fail_at {
            return Err(SessionError::Screenshot(format!(
                "fake screenshot {shot} refused"
            )));
        }
        Ok(format!("jpeg-{shot}").into_bytes())
    }

    async fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Store wrapper that accepts the first `allow` writes and rejects the rest.
pub(crate) struct FailAfterStore {
    inner: Arc<dyn ObjectStore>,
    allow: usize,
    seen: AtomicUsize,
}

impl FailAfterStore {
    pub fn new(inner: Arc<dyn ObjectStore>, allow: usize) -> Self {
        Self {
            inner,
            allow,
            seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ObjectStore for FailAfterStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst);
        if seen >= self.allow {
            return Err(StoreError::InvalidKey(format!("fake store refused {key}")));
        }
        self.inner.put(key, bytes).await
    }
}
