//! Failure taxonomy for one capture request.
//!
//! Validation failures are user-caused and map to a 400 with the exact rule
//! message; everything else is an opaque 500 and the logs carry the cause.
//! Nothing here is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use artifact_store::StoreError;
use browser_session::SessionError;
use capture_plan::{PlanError, ViewportTarget};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("session launch failed: {0}")]
    SessionLaunch(#[source] SessionError),
    #[error("page open failed: {0}")]
    PageOpen(#[source] SessionError),
    #[error("capture step failed at {width}x{height}: {source}")]
    CaptureStep {
        width: u32,
        height: u32,
        #[source]
        source: SessionError,
    },
    #[error("storage write failed for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("capture actor unavailable")]
    ActorUnavailable,
}

impl CaptureError {
    pub(crate) fn step(target: ViewportTarget, source: SessionError) -> Self {
        Self::CaptureStep {
            width: target.width,
            height: target.height,
            source,
        }
    }
}

impl IntoResponse for CaptureError {
    fn into_response(self) -> Response {
        match self {
            CaptureError::Plan(err) => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            other => {
                error!(%other, "capture request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "capture failed").into_response()
            }
        }
    }
}
