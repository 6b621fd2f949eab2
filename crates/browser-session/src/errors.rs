use thiserror::Error;

/// Failures surfaced by the browser collaborator. The hint strings carry the
/// underlying CDP error for the logs; callers never retry.
#[derive(Clone, Debug, Error)]
pub enum SessionError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("page open failed: {0}")]
    PageOpen(String),
    #[error("viewport override failed: {0}")]
    Viewport(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("screenshot capture failed: {0}")]
    Screenshot(String),
    #[error("close failed: {0}")]
    Close(String),
}
