//! snapgrid library
//!
//! Captures a target page at five fixed viewport sizes through one
//! long-lived Chromium session per subject and persists the JPEGs to an
//! object store. The session survives across requests behind a keep-alive
//! timer and is torn down after the idle budget expires.

pub mod actor;
pub mod config;
pub mod controller;
pub mod errors;
pub mod metrics;
pub mod registry;
pub mod server;

#[cfg(test)]
pub(crate) mod testkit;

pub use controller::{SessionLifecycleController, TickOutcome};
pub use errors::CaptureError;
