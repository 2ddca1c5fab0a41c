//! Embed formatting for status reports

use crate::status::{ServiceStatus, StatusReport};
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter, Timestamp};
use std::fmt::Write as _;

/// Longest incident update shown before truncation
pub const MAX_UPDATE_CHARS: usize = 200;
/// Discord's limit on an embed field value
pub const MAX_FIELD_CHARS: usize = 1024;

/// Cut `text` to `max` characters, appending an ellipsis when shortened.
/// The result can be up to three characters longer than `max`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Text of the incidents field, `None` when there are no incidents
#[must_use]
pub fn incidents_text(report: &StatusReport) -> Option<String> {
    if report.incidents.is_empty() {
        return None;
    }

    let mut text = String::new();
    for incident in &report.incidents {
        let _ = write!(text, "**{}** ({})", incident.name, incident.status);
        if let Some(updated_at) = incident.updated_at {
            let _ = write!(text, " <t:{}:R>", updated_at.timestamp());
        }
        text.push('\n');
        if let Some(update) = &incident.latest_update {
            let _ = writeln!(text, "{}\n", truncate(update, MAX_UPDATE_CHARS));
        }
    }
    Some(text)
}

/// Text of the affected components field, `None` when everything is operational
#[must_use]
pub fn components_text(report: &StatusReport) -> Option<String> {
    if report.affected_components.is_empty() {
        return None;
    }

    let mut text = String::new();
    for component in &report.affected_components {
        let _ = writeln!(text, "• {}: {}", component.name, component.status);
    }
    Some(text)
}

/// Rich embed describing a status report
#[must_use]
pub fn status_embed(report: &StatusReport) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title(format!("{} Status", report.service.display_name()))
        .description(format!("**Overall Status:** {}", report.description))
        .colour(report.status.colour())
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("Last updated"));

    let embed = match incidents_text(report) {
        Some(text) => embed.field("Recent Incidents", field_value(&text), false),
        None => embed.field("Incidents", "No current incidents", false),
    };

    match components_text(report) {
        Some(text) => embed.field("Affected Components", field_value(&text), false),
        None => embed.field("Components", "All systems operational", false),
    }
}

/// `text` cut to fit an embed field, ellipsis included
fn field_value(text: &str) -> String {
    truncate(text, MAX_FIELD_CHARS - 3)
}

/// Human-readable status transition, e.g. `operational → outage`
#[must_use]
pub fn transition_text(previous: Option<ServiceStatus>, current: ServiceStatus) -> String {
    match previous {
        Some(previous) => format!("{previous} → {current}"),
        None => format!("first check → {current}"),
    }
}
