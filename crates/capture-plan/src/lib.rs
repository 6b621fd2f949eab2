//! Capture planning for snapgrid.
//!
//! Pure helpers only: given a raw URL and a wall-clock instant, either reject
//! the URL or produce the canonical URL, the ordered viewport targets and the
//! storage key prefix every artifact of the run lands under. No I/O happens
//! here; the controller drives the plan against the browser and store.

pub mod bucket;
pub mod errors;
pub mod model;

pub use bucket::{bucket_label, bucket_start, BUCKET_WINDOW_SECS};
pub use errors::PlanError;
pub use model::{sanitize_url, CapturePlan, ViewportTarget, CAPTURE_TARGETS};
