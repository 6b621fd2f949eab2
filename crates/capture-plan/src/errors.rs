use thiserror::Error;

/// Rejection reasons for a raw capture URL.
///
/// Rules are checked in declaration order and the first failure wins; the
/// display strings are the exact response bodies the HTTP surface returns.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PlanError {
    #[error("URL is required")]
    Missing,
    #[error("URL must start with http or https")]
    BadScheme,
    #[error("URL must contain a domain")]
    NoDomain,
    #[error("URL cannot contain spaces")]
    HasSpaces,
    #[error("URL cannot be localhost")]
    Localhost,
}
