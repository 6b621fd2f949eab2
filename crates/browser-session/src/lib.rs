//! Browser-automation collaborator for snapgrid.
//!
//! Exposes the narrow launcher/session/page surface the capture controller
//! drives, plus the chromiumoxide-backed implementation that launches
//! headless Chromium and speaks CDP to it. The controller never sees
//! chromiumoxide types; tests substitute the traits with counting fakes.

pub mod chromium;
pub mod config;
pub mod errors;
pub mod session;

pub use chromium::ChromiumLauncher;
pub use config::{detect_chrome_executable, BrowserSessionConfig};
pub use errors::SessionError;
pub use session::{BrowserLauncher, PageHandle, SessionHandle};
