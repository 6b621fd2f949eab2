use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{detect_chrome_executable, BrowserSessionConfig};
use crate::errors::SessionError;
use crate::session::{BrowserLauncher, PageHandle, SessionHandle};

/// Launches headless Chromium sessions over CDP.
pub struct ChromiumLauncher {
    cfg: BrowserSessionConfig,
}

impl ChromiumLauncher {
    pub fn new(cfg: BrowserSessionConfig) -> Self {
        Self { cfg }
    }

    fn browser_config(&self) -> Result<BrowserConfig, SessionError> {
        let executable = if self.cfg.executable.as_os_str().is_empty() {
            detect_chrome_executable().ok_or_else(|| {
                SessionError::Launch(
                    "no chrome/chromium executable found; set SNAPGRID_CHROME".to_string(),
                )
            })?
        } else if !self.cfg.executable.exists() {
            return Err(SessionError::Launch(format!(
                "chrome executable not found at {}",
                self.cfg.executable.display()
            )));
        } else {
            self.cfg.executable.clone()
        };

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(self.cfg.request_timeout_ms))
            .launch_timeout(Duration::from_millis(self.cfg.launch_timeout_ms))
            .chrome_executable(executable);

        if !self.cfg.headless {
            builder = builder.with_head();
        }

        if std::env::var("SNAPGRID_DISABLE_SANDBOX")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
        {
            builder = builder.no_sandbox();
        }

        let mut args = vec![
            "--disable-background-networking",
            "--disable-background-timer-throttling",
            "--disable-breakpad",
            "--disable-component-update",
            "--disable-default-apps",
            "--disable-dev-shm-usage",
            "--disable-extensions",
            "--disable-hang-monitor",
            "--disable-popup-blocking",
            "--disable-sync",
            "--metrics-recording-only",
            "--no-first-run",
            "--no-default-browser-check",
        ];
        if self.cfg.headless {
            args.push("--headless=new");
            args.push("--hide-scrollbars");
            args.push("--mute-audio");
        }
        builder = builder.args(args);

        builder
            .build()
            .map_err(|err| SessionError::Launch(format!("browser config error: {err}")))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn SessionHandle>, SessionError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| SessionError::Launch(err.to_string()))?;

        // The handler task owns the CDP event loop; when the websocket drops
        // or the process dies the stream ends and the liveness flag flips.
        let alive = Arc::new(AtomicBool::new(true));
        let loop_alive = alive.clone();
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "browser-session", %err, "cdp handler event error");
                }
            }
            loop_alive.store(false, Ordering::Relaxed);
            debug!(target: "browser-session", "cdp event stream ended");
        });

        info!(target: "browser-session", "chromium session launched");
        Ok(Box::new(ChromiumSession {
            browser,
            event_loop,
            alive,
        }))
    }
}

/// One launched Chromium instance plus its CDP event loop.
pub struct ChromiumSession {
    browser: Browser,
    event_loop: JoinHandle<()>,
    alive: Arc<AtomicBool>,
}

#[async_trait]
impl SessionHandle for ChromiumSession {
    fn is_connected(&self) -> bool {
        self.alive.load(Ordering::Relaxed) && !self.event_loop.is_finished()
    }

    async fn new_page(&self) -> Result<Box<dyn PageHandle>, SessionError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|err| SessionError::PageOpen(err.to_string()))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|err| SessionError::Close(err.to_string()));
        self.alive.store(false, Ordering::Relaxed);
        self.event_loop.abort();
        info!(target: "browser-session", "chromium session closed");
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Relaxed);
        self.event_loop.abort();
    }
}

/// One open tab.
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn set_viewport(&self, width: u32, height: u32) -> Result<(), SessionError> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(width as i64)
            .height(height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(SessionError::Viewport)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| SessionError::Viewport(err.to_string()))?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| SessionError::Navigation(err.to_string()))?;
        if let Err(err) = self.page.wait_for_navigation().await {
            // Some pages never emit the lifecycle event chromiumoxide waits
            // on; the navigation itself already succeeded above.
            warn!(target: "browser-session", %err, url, "wait_for_navigation did not settle");
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Jpeg)
                    .build(),
            )
            .await
            .map_err(|err| SessionError::Screenshot(err.to_string()))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|err| SessionError::Close(err.to_string()))
    }
}
