use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bucket::bucket_label;
use crate::errors::PlanError;

/// One viewport configuration to render and screenshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ViewportTarget {
    pub width: u32,
    pub height: u32,
}

impl ViewportTarget {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// File name of the artifact captured at this viewport.
    pub fn file_name(&self) -> String {
        format!("screenshot_{}x{}.jpg", self.width, self.height)
    }
}

/// Fixed capture sequence; the order here is also the storage write order.
pub const CAPTURE_TARGETS: [ViewportTarget; 5] = [
    ViewportTarget::new(1920, 1080),
    ViewportTarget::new(1366, 768),
    ViewportTarget::new(1536, 864),
    ViewportTarget::new(360, 640),
    ViewportTarget::new(414, 896),
];

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_url(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// A validated capture request: the canonical URL, the ordered viewport
/// targets and the storage prefix all artifacts of this run land under.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CapturePlan {
    pub canonical_url: String,
    pub targets: Vec<ViewportTarget>,
    pub storage_key_prefix: String,
}

impl CapturePlan {
    /// Validates `raw_url` and derives the plan for the bucket containing
    /// `now`. Rules apply in order; the first failure wins and no partial
    /// plan is produced.
    pub fn build(raw_url: &str, now: DateTime<Utc>) -> Result<Self, PlanError> {
        if raw_url.is_empty() {
            return Err(PlanError::Missing);
        }
        if !raw_url.starts_with("http") {
            return Err(PlanError::BadScheme);
        }
        if !raw_url.contains('.') {
            return Err(PlanError::NoDomain);
        }
        if raw_url.contains(' ') {
            return Err(PlanError::HasSpaces);
        }
        if raw_url.contains("localhost") {
            return Err(PlanError::Localhost);
        }

        Ok(Self {
            canonical_url: raw_url.to_string(),
            targets: CAPTURE_TARGETS.to_vec(),
            storage_key_prefix: format!("{}/{}", sanitize_url(raw_url), bucket_label(now)),
        })
    }

    /// Full object key for one target's artifact.
    pub fn key_for(&self, target: &ViewportTarget) -> String {
        format!("{}/{}", self.storage_key_prefix, target.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_100, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn rejects_empty_url() {
        let err = CapturePlan::build("", now()).unwrap_err();
        assert_eq!(err, PlanError::Missing);
        assert_eq!(err.to_string(), "URL is required");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = CapturePlan::build("ftp://example.com", now()).unwrap_err();
        assert_eq!(err, PlanError::BadScheme);
        assert_eq!(err.to_string(), "URL must start with http or https");
    }

    #[test]
    fn rejects_missing_domain() {
        let err = CapturePlan::build("http://host", now()).unwrap_err();
        assert_eq!(err, PlanError::NoDomain);
        assert_eq!(err.to_string(), "URL must contain a domain");
    }

    #[test]
    fn rejects_spaces() {
        let err = CapturePlan::build("http://exa mple.com", now()).unwrap_err();
        assert_eq!(err, PlanError::HasSpaces);
        assert_eq!(err.to_string(), "URL cannot contain spaces");
    }

    #[test]
    fn rejects_localhost() {
        let err = CapturePlan::build("http://dev.localhost:8080", now()).unwrap_err();
        assert_eq!(err, PlanError::Localhost);
        assert_eq!(err.to_string(), "URL cannot be localhost");
    }

    #[test]
    fn dotless_localhost_hits_the_domain_rule_first() {
        // no `.` anywhere, so the domain rule fires before the localhost rule
        let err = CapturePlan::build("http://localhost:8080", now()).unwrap_err();
        assert_eq!(err, PlanError::NoDomain);
    }

    #[test]
    fn first_failing_rule_wins() {
        // contains a space AND references localhost; the space rule is
        // checked first
        let err = CapturePlan::build("http://local host.com", now()).unwrap_err();
        assert_eq!(err, PlanError::HasSpaces);
    }

    #[test]
    fn plan_for_example_com() {
        let plan = CapturePlan::build("https://example.com", now()).expect("valid url");
        assert_eq!(plan.canonical_url, "https://example.com");
        assert!(plan
            .storage_key_prefix
            .starts_with("https___example_com/"));
        assert_eq!(
            plan.targets,
            vec![
                ViewportTarget::new(1920, 1080),
                ViewportTarget::new(1366, 768),
                ViewportTarget::new(1536, 864),
                ViewportTarget::new(360, 640),
                ViewportTarget::new(414, 896),
            ]
        );
    }

    #[test]
    fn keys_follow_prefix_and_target() {
        let plan = CapturePlan::build("https://example.com", now()).expect("valid url");
        let first = plan.key_for(&plan.targets[0]);
        assert_eq!(
            first,
            format!("{}/screenshot_1920x1080.jpg", plan.storage_key_prefix)
        );
        let last = plan.key_for(&plan.targets[4]);
        assert!(last.ends_with("/screenshot_414x896.jpg"));
    }

    #[test]
    fn planning_is_idempotent_for_fixed_instant() {
        let a = CapturePlan::build("https://example.com/page?a=1", now()).expect("valid url");
        let b = CapturePlan::build("https://example.com/page?a=1", now()).expect("valid url");
        assert_eq!(a.storage_key_prefix, b.storage_key_prefix);
        assert_eq!(a.targets, b.targets);
    }

    #[test]
    fn sanitize_replaces_non_alphanumerics() {
        assert_eq!(sanitize_url("https://example.com"), "https___example_com");
        assert_eq!(sanitize_url("a1-b2_c3"), "a1_b2_c3");
    }
}
