//! Monitored services and the status values they can report

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A third-party service whose status page is polled
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    #[display("vercel")]
    Vercel,
    #[display("cloudflare")]
    Cloudflare,
    #[display("netlify")]
    Netlify,
}

impl ServiceName {
    /// Every monitored service, in broadcast order
    pub const ALL: [Self; 3] = [Self::Vercel, Self::Cloudflare, Self::Netlify];

    /// Persisted form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vercel => "vercel",
            Self::Cloudflare => "cloudflare",
            Self::Netlify => "netlify",
        }
    }

    /// Capitalised name used in embeds and replies
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Vercel => "Vercel",
            Self::Cloudflare => "Cloudflare",
            Self::Netlify => "Netlify",
        }
    }

    /// Statuspage API root used when the config does not override it
    #[must_use]
    pub const fn default_status_page(self) -> &'static str {
        match self {
            Self::Vercel => "https://vercel.statuspage.io/api/v2",
            Self::Cloudflare => "https://www.cloudflarestatus.com/api/v2",
            Self::Netlify => "https://www.netlifystatus.com/api/v2",
        }
    }
}

impl FromStr for ServiceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vercel" => Ok(Self::Vercel),
            "cloudflare" => Ok(Self::Cloudflare),
            "netlify" => Ok(Self::Netlify),
            other => Err(format!("unknown service: {other}")),
        }
    }
}

/// Overall health of a service as seen on its status page
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[display("operational")]
    Operational,
    #[display("degraded")]
    Degraded,
    #[display("outage")]
    Outage,
    #[display("unknown")]
    Unknown,
}

impl ServiceStatus {
    /// Map a Statuspage overall indicator onto a status
    #[must_use]
    pub fn from_indicator(indicator: &str) -> Self {
        match indicator {
            "none" => Self::Operational,
            "minor" | "maintenance" => Self::Degraded,
            "major" | "critical" => Self::Outage,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Degraded => "degraded",
            Self::Outage => "outage",
            Self::Unknown => "unknown",
        }
    }

    /// Embed colour
    #[must_use]
    pub const fn colour(self) -> u32 {
        match self {
            Self::Operational => 0x00ff00,
            Self::Degraded => 0xffff00,
            Self::Outage => 0xff0000,
            Self::Unknown => 0x808080,
        }
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(Self::Operational),
            "degraded" => Ok(Self::Degraded),
            "outage" => Ok(Self::Outage),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown service status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_parse() {
        assert_eq!("vercel".parse::<ServiceName>(), Ok(ServiceName::Vercel));
        assert_eq!(" Cloudflare ".parse::<ServiceName>(), Ok(ServiceName::Cloudflare));
        assert_eq!("NETLIFY".parse::<ServiceName>(), Ok(ServiceName::Netlify));
        assert!("github".parse::<ServiceName>().is_err());
    }

    #[test]
    fn test_service_name_display_matches_persisted_form() {
        for service in ServiceName::ALL {
            assert_eq!(service.to_string(), service.as_str());
        }
        assert_eq!(ServiceName::Cloudflare.display_name(), "Cloudflare");
    }

    #[test]
    fn test_indicator_mapping() {
        assert_eq!(ServiceStatus::from_indicator("none"), ServiceStatus::Operational);
        assert_eq!(ServiceStatus::from_indicator("minor"), ServiceStatus::Degraded);
        assert_eq!(ServiceStatus::from_indicator("maintenance"), ServiceStatus::Degraded);
        assert_eq!(ServiceStatus::from_indicator("major"), ServiceStatus::Outage);
        assert_eq!(ServiceStatus::from_indicator("critical"), ServiceStatus::Outage);
        assert_eq!(ServiceStatus::from_indicator("???"), ServiceStatus::Unknown);
    }

    #[test]
    fn test_status_text_is_stable() {
        for status in [
            ServiceStatus::Operational,
            ServiceStatus::Degraded,
            ServiceStatus::Outage,
            ServiceStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<ServiceStatus>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
