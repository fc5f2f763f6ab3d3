//! Shared data model for AstroGuard.
//!
//! Everything that both the event generator and the query processor agree on
//! lives here: the closed set of event types, the severity scale, the event
//! record itself and the fixed location table used for map coordinates.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventType {
    FailedLogin,
    VpnConnection,
    MalwareDetection,
    SuccessfulLogin,
    FirewallBlock,
    GroundStationAccess,
    TelemetryDataAccess,
    CommandControlAccess,
    SatelliteCommAnomaly,
}

impl EventType {
    pub const MISSION_CRITICAL: [EventType; 4] = [
        EventType::GroundStationAccess,
        EventType::TelemetryDataAccess,
        EventType::CommandControlAccess,
        EventType::SatelliteCommAnomaly,
    ];

    pub fn all() -> Vec<EventType> {
        vec![
            Self::FailedLogin,
            Self::VpnConnection,
            Self::MalwareDetection,
            Self::SuccessfulLogin,
            Self::FirewallBlock,
            Self::GroundStationAccess,
            Self::TelemetryDataAccess,
            Self::CommandControlAccess,
            Self::SatelliteCommAnomaly,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FailedLogin => "failed_login",
            EventType::VpnConnection => "vpn_connection",
            EventType::MalwareDetection => "malware_detection",
            EventType::SuccessfulLogin => "successful_login",
            EventType::FirewallBlock => "firewall_block",
            EventType::GroundStationAccess => "ground_station_access",
            EventType::TelemetryDataAccess => "telemetry_data_access",
            EventType::CommandControlAccess => "command_control_access",
            EventType::SatelliteCommAnomaly => "satellite_comm_anomaly",
        }
    }

    pub fn is_mission_critical(&self) -> bool {
        Self::MISSION_CRITICAL.contains(self)
    }

    /// Human label with every underscore replaced and each word capitalised,
    /// e.g. `Ground Station Access`.
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("event type", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn all() -> Vec<Severity> {
        vec![Self::High, Self::Medium, Self::Low]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Numeric rank, higher is worse.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    /// Inclusive risk-score band for events of this severity.
    pub fn risk_band(&self) -> (u8, u8) {
        match self {
            Severity::High => (70, 99),
            Severity::Medium => (40, 69),
            Severity::Low => (10, 39),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(UnknownVariant::new("severity", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownLocation {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl KnownLocation {
    pub fn is_domestic(&self) -> bool {
        is_domestic(self.name)
    }
}

pub const DOMESTIC_SUFFIX: &str = ", IN";

pub static LOCATIONS: [KnownLocation; 15] = [
    KnownLocation { name: "Bangalore, IN", latitude: 12.9716, longitude: 77.5946 },
    KnownLocation { name: "Thiruvananthapuram, IN", latitude: 8.5241, longitude: 76.9366 },
    KnownLocation { name: "Sriharikota, IN", latitude: 13.7199, longitude: 80.2304 },
    KnownLocation { name: "Ahmedabad, IN", latitude: 23.0225, longitude: 72.5714 },
    KnownLocation { name: "Mumbai, IN", latitude: 19.0760, longitude: 72.8777 },
    KnownLocation { name: "New York, US", latitude: 40.7128, longitude: -74.0060 },
    KnownLocation { name: "London, UK", latitude: 51.5074, longitude: -0.1278 },
    KnownLocation { name: "Beijing, CN", latitude: 39.9042, longitude: 116.4074 },
    KnownLocation { name: "Moscow, RU", latitude: 55.7558, longitude: 37.6173 },
    KnownLocation { name: "Sydney, AU", latitude: -33.8688, longitude: 151.2093 },
    KnownLocation { name: "Berlin, DE", latitude: 52.5200, longitude: 13.4050 },
    KnownLocation { name: "Paris, FR", latitude: 48.8566, longitude: 2.3522 },
    KnownLocation { name: "Toronto, CA", latitude: 43.6532, longitude: -79.3832 },
    KnownLocation { name: "Singapore, SG", latitude: 1.3521, longitude: 103.8198 },
    KnownLocation { name: "Dubai, AE", latitude: 25.2048, longitude: 55.2708 },
];

pub fn lookup_location(name: &str) -> Option<&'static KnownLocation> {
    LOCATIONS.iter().find(|l| l.name == name)
}

pub fn is_domestic(location: &str) -> bool {
    location.ends_with(DOMESTIC_SUFFIX)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SecurityEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(rename = "eventType"))]
    pub event_type: EventType,
    pub severity: Severity,
    pub ip: String,
    pub username: String,
    pub location: String,
    pub details: String,
    pub risk_score: u8,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub latitude: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub longitude: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "mitreAttack", default, skip_serializing_if = "Option::is_none")
    )]
    pub mitre_attack: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "isMissionCritical"))]
    pub is_mission_critical: bool,
}

impl SecurityEvent {
    /// Formats the sequential identifier, `EVT-000042` for sequence 42.
    pub fn format_id(sequence: usize) -> String {
        format!("EVT-{:06}", sequence)
    }

    pub fn new(id: impl Into<String>, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            timestamp: DateTime::<Utc>::default(),
            event_type,
            severity: Severity::Low,
            ip: String::new(),
            username: String::new(),
            location: String::new(),
            details: String::new(),
            risk_score: 0,
            latitude: None,
            longitude: None,
            mitre_attack: None,
            is_mission_critical: event_type.is_mission_critical(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_risk_score(mut self, risk_score: u8) -> Self {
        self.risk_score = risk_score;
        self
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ip = ip.to_string();
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    /// Sets the location and, when it is in the fixed table, its coordinates.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        let coords = lookup_location(location);
        self.latitude = coords.map(|l| l.latitude);
        self.longitude = coords.map(|l| l.longitude);
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }

    pub fn with_mitre_attack(mut self, technique: &str) -> Self {
        self.mitre_attack = Some(technique.to_string());
        self
    }

    pub fn is_domestic(&self) -> bool {
        is_domestic(&self.location)
    }
}
