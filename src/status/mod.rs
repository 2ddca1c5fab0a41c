//! Status checks against third-party status pages
//!
//! This module owns the monitored service set, the status values they report,
//! the Statuspage HTTP client and the embeds built from its reports.

mod checker;
pub mod embed;
mod error;
mod report;
mod service;

#[cfg(test)]
pub use checker::MockStatusChecker;
pub use checker::{StatusChecker, StatuspageClient};
pub use error::{FetchError, FetchResult};
pub use report::{
    AffectedComponent, ComponentsDocument, Incident, IncidentsDocument, StatusDocument,
    StatusReport,
};
pub use service::{ServiceName, ServiceStatus};
