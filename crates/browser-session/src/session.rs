use async_trait::async_trait;

use crate::errors::SessionError;

/// Launches fresh browser sessions. The controller calls this lazily on the
/// first capture and again whenever the previous session is no longer
/// connected.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn SessionHandle>, SessionError>;
}

/// A live connection to one browser instance, reusable across capture runs.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Cheap liveness probe; a `false` here means the handle is dead and must
    /// be discarded without an explicit close.
    fn is_connected(&self) -> bool;

    async fn new_page(&self) -> Result<Box<dyn PageHandle>, SessionError>;

    /// Tears down the underlying connection and the browser process.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// One open tab, driven sequentially through the capture loop.
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn set_viewport(&self, width: u32, height: u32) -> Result<(), SessionError>;

    async fn goto(&self, url: &str) -> Result<(), SessionError>;

    /// Captures the current viewport as JPEG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
