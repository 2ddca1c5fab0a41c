//! Statuspage API documents and the report built from them

use crate::status::{ServiceName, ServiceStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Most recent incidents kept in a report
pub const MAX_INCIDENTS: usize = 3;
/// Affected components kept in a report
pub const MAX_COMPONENTS: usize = 5;

/// `status.json`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDocument {
    pub status: StatusIndicator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusIndicator {
    pub indicator: String,
    pub description: String,
}

/// `incidents.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentsDocument {
    #[serde(default)]
    pub incidents: Vec<IncidentDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub incident_updates: Vec<IncidentUpdateDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentUpdateDocument {
    #[serde(default)]
    pub body: Option<String>,
}

/// `components.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentsDocument {
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDocument {
    pub name: String,
    pub status: String,
}

/// An incident as shown in embeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub id: String,
    pub name: String,
    pub status: String,
    pub updated_at: Option<DateTime<Utc>>,
    /// Body of the latest update, if any
    pub latest_update: Option<String>,
}

/// A component that is not operational
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedComponent {
    pub name: String,
    pub status: String,
}

/// Result of one successful status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub service: ServiceName,
    pub status: ServiceStatus,
    /// Raw Statuspage indicator (`none`, `minor`, ...)
    pub indicator: String,
    pub description: String,
    pub incidents: Vec<Incident>,
    pub affected_components: Vec<AffectedComponent>,
}

impl StatusReport {
    /// Build a report from the three Statuspage documents
    #[must_use]
    pub fn from_documents(
        service: ServiceName,
        status: StatusDocument,
        incidents: IncidentsDocument,
        components: ComponentsDocument,
    ) -> Self {
        let incidents = incidents
            .incidents
            .into_iter()
            .take(MAX_INCIDENTS)
            .map(|incident| Incident {
                id: incident.id,
                name: incident
                    .name
                    .unwrap_or_else(|| "Unnamed incident".to_string()),
                status: incident.status.unwrap_or_else(|| "unknown".to_string()),
                updated_at: incident.updated_at,
                latest_update: incident
                    .incident_updates
                    .into_iter()
                    .next()
                    .and_then(|update| update.body)
                    .filter(|body| !body.is_empty()),
            })
            .collect();

        let affected_components = components
            .components
            .into_iter()
            .filter(|component| component.status != "operational")
            .take(MAX_COMPONENTS)
            .map(|component| AffectedComponent {
                name: component.name,
                status: component.status,
            })
            .collect();

        Self {
            service,
            status: ServiceStatus::from_indicator(&status.status.indicator),
            indicator: status.status.indicator,
            description: status.status.description,
            incidents,
            affected_components,
        }
    }

    /// A minimal report with no incidents or affected components
    #[must_use]
    pub fn new(service: ServiceName, status: ServiceStatus, description: impl Into<String>) -> Self {
        Self {
            service,
            status,
            indicator: String::new(),
            description: description.into(),
            incidents: Vec::new(),
            affected_components: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_JSON: &str = r#"{
        "page": {"id": "abc", "name": "Vercel"},
        "status": {"indicator": "minor", "description": "Partially Degraded Service"}
    }"#;

    const INCIDENTS_JSON: &str = r#"{
        "incidents": [
            {"id": "i1", "name": "Build delays", "status": "investigating",
             "updated_at": "2024-05-01T10:15:00.000-07:00",
             "incident_updates": [{"body": "We are looking into it."}]},
            {"id": "i2", "name": null, "status": "resolved", "incident_updates": []},
            {"id": "i3", "name": "Edge errors", "status": "monitoring",
             "incident_updates": [{"body": ""}]},
            {"id": "i4", "name": "Old", "status": "resolved", "incident_updates": []}
        ]
    }"#;

    const COMPONENTS_JSON: &str = r#"{
        "components": [
            {"name": "API", "status": "operational"},
            {"name": "Builds", "status": "degraded_performance"},
            {"name": "Edge Network", "status": "partial_outage"}
        ]
    }"#;

    fn sample_report() -> StatusReport {
        StatusReport::from_documents(
            ServiceName::Vercel,
            serde_json::from_str(STATUS_JSON).expect("status document"),
            serde_json::from_str(INCIDENTS_JSON).expect("incidents document"),
            serde_json::from_str(COMPONENTS_JSON).expect("components document"),
        )
    }

    #[test]
    fn test_report_from_documents() {
        let report = sample_report();
        assert_eq!(report.status, ServiceStatus::Degraded);
        assert_eq!(report.indicator, "minor");
        assert_eq!(report.description, "Partially Degraded Service");
    }

    #[test]
    fn test_report_keeps_latest_incidents_only() {
        let report = sample_report();
        assert_eq!(report.incidents.len(), MAX_INCIDENTS);
        assert_eq!(report.incidents[0].latest_update.as_deref(), Some("We are looking into it."));
        assert_eq!(
            report.incidents[0].updated_at.map(|at| at.timestamp()),
            Some(1_714_583_700)
        );
        assert_eq!(report.incidents[1].name, "Unnamed incident");
        assert!(report.incidents[1].updated_at.is_none());
        assert!(report.incidents[1].latest_update.is_none());
        // Empty update bodies are dropped
        assert!(report.incidents[2].latest_update.is_none());
    }

    #[test]
    fn test_report_filters_operational_components() {
        let report = sample_report();
        let names: Vec<_> = report
            .affected_components
            .iter()
            .map(|component| component.name.as_str())
            .collect();
        assert_eq!(names, vec!["Builds", "Edge Network"]);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let incidents: IncidentsDocument = serde_json::from_str("{}").expect("incidents");
        let components: ComponentsDocument = serde_json::from_str("{}").expect("components");
        let report = StatusReport::from_documents(
            ServiceName::Netlify,
            serde_json::from_str(STATUS_JSON).expect("status"),
            incidents,
            components,
        );
        assert!(report.incidents.is_empty());
        assert!(report.affected_components.is_empty());
    }

    #[test]
    fn test_incident_without_id_is_kept() {
        let incidents: IncidentsDocument = serde_json::from_str(
            r#"{"incidents": [{"name": "Partial API outage", "status": "identified"}]}"#,
        )
        .expect("incidents document");

        let report = StatusReport::from_documents(
            ServiceName::Netlify,
            serde_json::from_str(STATUS_JSON).expect("status document"),
            incidents,
            ComponentsDocument::default(),
        );
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].id, "");
        assert_eq!(report.incidents[0].name, "Partial API outage");
        assert_eq!(report.incidents[0].status, "identified");
    }
}
