//! Status check abstraction and its Statuspage implementation

use crate::status::{
    ComponentsDocument, FetchError, FetchResult, IncidentsDocument, ServiceName, StatusDocument,
    StatusReport,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Something that can report the current status of a service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatusChecker: Send + Sync {
    /// Fetch the current status of `service`.
    ///
    /// Implementations must return rather than hang: every call is bounded by
    /// a timeout shorter than the broadcast period.
    async fn check_status(&self, service: ServiceName) -> FetchResult<StatusReport>;
}

/// Reads Atlassian Statuspage v2 JSON documents over HTTP
#[derive(Debug, Clone)]
pub struct StatuspageClient {
    http: reqwest::Client,
    pages: HashMap<ServiceName, String>,
}

impl StatuspageClient {
    /// Create a client with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(pages: HashMap<ServiceName, String>, timeout: Duration) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("status-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, pages })
    }

    /// Status pages this client knows about
    #[must_use]
    pub fn pages(&self) -> &HashMap<ServiceName, String> {
        &self.pages
    }

    async fn fetch<T: DeserializeOwned>(&self, base: &str, document: &str) -> FetchResult<T> {
        let url = format!("{}/{document}", base.trim_end_matches('/'));
        debug!("Fetching {url}");
        let value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(value)
    }
}

#[async_trait::async_trait]
impl StatusChecker for StatuspageClient {
    async fn check_status(&self, service: ServiceName) -> FetchResult<StatusReport> {
        let base = self
            .pages
            .get(&service)
            .ok_or(FetchError::NoStatusPage(service))?;

        let (status, incidents, components) = tokio::try_join!(
            self.fetch::<StatusDocument>(base, "status.json"),
            self.fetch::<IncidentsDocument>(base, "incidents.json"),
            self.fetch::<ComponentsDocument>(base, "components.json"),
        )?;

        Ok(StatusReport::from_documents(
            service, status, incidents, components,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ServiceStatus;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const STATUS: &str = r#"{"status": {"indicator": "major", "description": "Partial System Outage"}}"#;
    const INCIDENTS: &str = r#"{"incidents": [{"id": "x1", "name": "DNS failures", "status": "identified",
        "incident_updates": [{"body": "Resolvers are failing in EU."}]}]}"#;
    const COMPONENTS: &str = r#"{"components": [{"name": "DNS", "status": "major_outage"},
        {"name": "CDN", "status": "operational"}]}"#;

    /// Serve the three Statuspage documents under `/api/v2/` on a loopback port
    async fn statuspage_fixture() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let path = request.split_whitespace().nth(1).unwrap_or("");

                    let (code, body) = match path {
                        "/api/v2/status.json" => ("200 OK", STATUS),
                        "/api/v2/incidents.json" => ("200 OK", INCIDENTS),
                        "/api/v2/components.json" => ("200 OK", COMPONENTS),
                        _ => ("404 Not Found", "{}"),
                    };
                    let response = format!(
                        "HTTP/1.1 {code}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/api/v2/")
    }

    #[tokio::test]
    async fn test_check_status_reads_all_documents() {
        // Trailing slash on the base must not double up
        let base = statuspage_fixture().await;
        let pages = HashMap::from([(ServiceName::Cloudflare, base)]);
        let client = StatuspageClient::new(pages, Duration::from_secs(5)).expect("client");

        let report = client
            .check_status(ServiceName::Cloudflare)
            .await
            .expect("fixture answers every document");

        assert_eq!(report.service, ServiceName::Cloudflare);
        assert_eq!(report.status, ServiceStatus::Outage);
        assert_eq!(report.indicator, "major");
        assert_eq!(report.description, "Partial System Outage");
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].name, "DNS failures");
        assert_eq!(
            report.incidents[0].latest_update.as_deref(),
            Some("Resolvers are failing in EU.")
        );
        assert_eq!(report.affected_components.len(), 1);
        assert_eq!(report.affected_components[0].name, "DNS");
    }

    #[tokio::test]
    async fn test_missing_document_is_a_fetch_error() {
        let base = statuspage_fixture().await;
        let pages = HashMap::from([(ServiceName::Vercel, format!("{base}missing"))]);
        let client = StatuspageClient::new(pages, Duration::from_secs(5)).expect("client");

        let result = client.check_status(ServiceName::Vercel).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_service_is_rejected() {
        let pages = HashMap::from([(
            ServiceName::Vercel,
            ServiceName::Vercel.default_status_page().to_string(),
        )]);
        let client = StatuspageClient::new(pages, Duration::from_secs(5)).expect("client");

        let result = client.check_status(ServiceName::Netlify).await;
        assert!(matches!(
            result,
            Err(FetchError::NoStatusPage(ServiceName::Netlify))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_page_is_a_fetch_error() {
        // Port 9 (discard) on loopback refuses connections
        let pages = HashMap::from([(ServiceName::Vercel, "http://127.0.0.1:9/api/v2".to_string())]);
        let client = StatuspageClient::new(pages, Duration::from_secs(2)).expect("client");

        let result = client.check_status(ServiceName::Vercel).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
