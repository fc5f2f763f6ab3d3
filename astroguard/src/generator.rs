//! Synthetic security event generation.
//!
//! Produces the dataset the query processor, alert detectors and reports work
//! over. Categorical attributes are drawn from fixed weighted tables so the
//! generated data keeps the conditional shape of real telemetry: severity
//! follows the event type and the risk score follows the severity.

use std::sync::Arc;

use astroguard_common::{EventType, KnownLocation, SecurityEvent, Severity, LOCATIONS};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::Configuration;

/// Event type weights. The units sum to 102, not 100.
pub const EVENT_TYPE_WEIGHTS: [(EventType, u32); 9] = [
    (EventType::FailedLogin, 40),
    (EventType::GroundStationAccess, 12),
    (EventType::TelemetryDataAccess, 8),
    (EventType::CommandControlAccess, 5),
    (EventType::MalwareDetection, 15),
    (EventType::VpnConnection, 10),
    (EventType::FirewallBlock, 7),
    (EventType::SuccessfulLogin, 3),
    (EventType::SatelliteCommAnomaly, 2),
];

pub const USERNAMES: [&str; 15] = [
    "admin",
    "john.doe",
    "jane.smith",
    "bob.wilson",
    "alice.jones",
    "charlie.brown",
    "david.lee",
    "emma.davis",
    "frank.miller",
    "grace.taylor",
    "mission.control",
    "satellite.ops",
    "ground.station",
    "isro.admin",
    "telemetry.eng",
];

pub const MALWARE_FAMILIES: [&str; 6] = [
    "Trojan.GenericKD",
    "Ransomware.WannaCry",
    "Spyware.Agent",
    "Adware.BrowseFox",
    "Rootkit.Hidden",
    "Worm.Conficker",
];

const DOMESTIC_PROBABILITY: f64 = 0.7;
const OPERATIONAL_USERNAME_PROBABILITY: f64 = 0.6;
const PROBABILISTIC_HIGH_SEVERITY: f64 = 0.4;
const VPN_ESTABLISHED_PROBABILITY: f64 = 0.7;

pub fn pool_size() -> u32 {
    EVENT_TYPE_WEIGHTS.iter().map(|(_, weight)| weight).sum()
}

/// MITRE ATT&CK techniques associated with each event type.
pub fn mitre_techniques(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::FailedLogin => &["T1110 - Brute Force", "T1078 - Valid Accounts"],
        EventType::MalwareDetection => {
            &["T1486 - Data Encrypted for Impact", "T1204 - User Execution"]
        }
        EventType::GroundStationAccess => {
            &["T1078.004 - Cloud Accounts", "T1552 - Unsecured Credentials"]
        }
        EventType::TelemetryDataAccess => &[
            "T1530 - Data from Cloud Storage",
            "T1213 - Data from Information Repositories",
        ],
        EventType::CommandControlAccess => {
            &["T1071 - Application Layer Protocol", "T1090 - Proxy"]
        }
        EventType::SatelliteCommAnomaly => {
            &["T1499 - Endpoint Denial of Service", "T1565 - Data Manipulation"]
        }
        EventType::VpnConnection => &["T1133 - External Remote Services"],
        EventType::FirewallBlock => &["T1595 - Active Scanning"],
        EventType::SuccessfulLogin => &[],
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Generates synthetic events relative to a point in time.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    lookback: Duration,
    domestic: Vec<&'static KnownLocation>,
    foreign: Vec<&'static KnownLocation>,
    operational_usernames: Vec<&'static str>,
}

impl EventGenerator {
    pub fn new() -> Self {
        Self::with_lookback_days(30)
    }

    pub fn with_lookback_days(days: u32) -> Self {
        let (domestic, foreign) = LOCATIONS.iter().partition(|l| l.is_domestic());
        Self {
            lookback: Duration::days(i64::from(days.max(1))),
            domestic,
            foreign,
            operational_usernames: USERNAMES
                .iter()
                .copied()
                .filter(|name| name.contains('.'))
                .collect(),
        }
    }

    /// Generate `count` events ending at the current time using the thread RNG.
    pub fn generate(&self, count: usize) -> Vec<SecurityEvent> {
        self.generate_with_rng(count, Utc::now(), &mut rand::thread_rng())
    }

    /// Generate `count` events with an injected clock and random source.
    ///
    /// Ids are assigned in generation order and the result is sorted newest
    /// first.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<SecurityEvent> {
        let mut events: Vec<SecurityEvent> = (1..=count)
            .map(|sequence| self.generate_event(sequence, now, rng))
            .collect();

        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!("Generated {} events", events.len());
        events
    }

    fn generate_event<R: Rng + ?Sized>(
        &self,
        sequence: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> SecurityEvent {
        let event_type = Self::draw_event_type(rng);
        let severity = Self::draw_severity(event_type, rng);
        let (low, high) = severity.risk_band();
        let risk_score = rng.gen_range(low..=high);

        let location = if rng.gen_bool(DOMESTIC_PROBABILITY) {
            pick(rng, &self.domestic)
        } else {
            pick(rng, &self.foreign)
        };

        let username = if event_type.is_mission_critical()
            && rng.gen_bool(OPERATIONAL_USERNAME_PROBABILITY)
        {
            *pick(rng, &self.operational_usernames)
        } else {
            *pick(rng, &USERNAMES)
        };

        let offset_ms = rng.gen_range(0..self.lookback.num_milliseconds());
        let timestamp = now - Duration::milliseconds(offset_ms);

        let ip = format!(
            "{}.{}.{}.{}",
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255)
        );

        let details = Self::draw_details(event_type, rng);

        let mut event = SecurityEvent::new(SecurityEvent::format_id(sequence), event_type)
            .with_timestamp(timestamp)
            .with_severity(severity)
            .with_risk_score(risk_score)
            .with_ip(&ip)
            .with_username(username)
            .with_location(location.name)
            .with_details(&details);

        let techniques = mitre_techniques(event_type);
        if !techniques.is_empty() {
            event = event.with_mitre_attack(*pick(rng, techniques));
        }

        event
    }

    fn draw_event_type<R: Rng + ?Sized>(rng: &mut R) -> EventType {
        let mut ticket = rng.gen_range(0..pool_size());
        for (event_type, weight) in EVENT_TYPE_WEIGHTS {
            if ticket < weight {
                return event_type;
            }
            ticket -= weight;
        }
        EventType::FailedLogin
    }

    fn draw_severity<R: Rng + ?Sized>(event_type: EventType, rng: &mut R) -> Severity {
        match event_type {
            EventType::MalwareDetection
            | EventType::CommandControlAccess
            | EventType::SatelliteCommAnomaly => Severity::High,
            EventType::FailedLogin
            | EventType::GroundStationAccess
            | EventType::TelemetryDataAccess => {
                if rng.gen_bool(PROBABILISTIC_HIGH_SEVERITY) {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            EventType::FirewallBlock => Severity::Medium,
            EventType::VpnConnection | EventType::SuccessfulLogin => Severity::Low,
        }
    }

    fn draw_details<R: Rng + ?Sized>(event_type: EventType, rng: &mut R) -> String {
        match event_type {
            EventType::FailedLogin => "Invalid password attempt".to_string(),
            EventType::VpnConnection => {
                if rng.gen_bool(VPN_ESTABLISHED_PROBABILITY) {
                    "VPN connection established".to_string()
                } else {
                    "VPN connection failed".to_string()
                }
            }
            EventType::MalwareDetection => {
                format!("Malware detected: {}", pick(rng, &MALWARE_FAMILIES))
            }
            EventType::SuccessfulLogin => "User authenticated successfully".to_string(),
            EventType::FirewallBlock => "Suspicious traffic blocked by firewall".to_string(),
            EventType::GroundStationAccess => {
                "Unauthorized access attempt to ground station controls".to_string()
            }
            EventType::TelemetryDataAccess => {
                "Suspicious telemetry data query detected".to_string()
            }
            EventType::CommandControlAccess => {
                "Unauthorized command & control system access".to_string()
            }
            EventType::SatelliteCommAnomaly => {
                "Anomalous satellite communication pattern detected".to_string()
            }
        }
    }
}

impl Default for EventGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-owned, read-only event dataset shared by every consumer.
#[derive(Debug, Clone)]
pub struct Dataset {
    events: Arc<[SecurityEvent]>,
    generated_at: DateTime<Utc>,
}

impl Dataset {
    /// Generate the dataset described by the configuration.
    pub fn generate(config: &Configuration) -> Self {
        Self::generate_at(config, Utc::now())
    }

    pub fn generate_at(config: &Configuration, now: DateTime<Utc>) -> Self {
        let generator = EventGenerator::with_lookback_days(config.lookback_days());
        let count = config.event_count();

        let events = match config.seed() {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                generator.generate_with_rng(count, now, &mut rng)
            }
            None => generator.generate_with_rng(count, now, &mut rand::thread_rng()),
        };

        info!(
            "Generated dataset of {} events (seed: {})",
            events.len(),
            config
                .seed()
                .map_or_else(|| "none".to_string(), |s| s.to_string())
        );

        Self {
            events: events.into(),
            generated_at: now,
        }
    }

    pub fn from_events(events: Vec<SecurityEvent>) -> Self {
        Self {
            events: events.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn events(&self) -> &[SecurityEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}
