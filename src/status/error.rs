//! Errors raised while fetching a status page

use crate::status::ServiceName;
use std::time::Duration;
use thiserror::Error;

/// A status check that did not produce a report
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed or the page answered with an error status
    #[error("Status page request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The check did not complete in time
    #[error("Status check for {service} timed out after {}s", after.as_secs())]
    Timeout { service: ServiceName, after: Duration },

    /// No status page is configured for the service
    #[error("No status page configured for {0}")]
    NoStatusPage(ServiceName),
}

pub type FetchResult<T> = Result<T, FetchError>;
