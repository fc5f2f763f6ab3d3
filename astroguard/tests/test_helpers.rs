//! Test utilities and helpers
//!
//! Builders and named fixtures that keep the integration tests focused on
//! behaviour rather than on assembling events by hand.

#![allow(dead_code)]

use astroguard::{configuration::Configuration, Dataset};
use astroguard_common::{EventType, SecurityEvent, Severity};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed reference clock used by every time-sensitive test.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Builder for creating test SecurityEvent instances with fluent API
pub struct SecurityEventBuilder {
    event: SecurityEvent,
}

impl SecurityEventBuilder {
    pub fn new(sequence: usize, event_type: EventType) -> Self {
        Self {
            event: SecurityEvent::new(SecurityEvent::format_id(sequence), event_type)
                .with_timestamp(fixed_now())
                .with_location("Bangalore, IN"),
        }
    }

    pub fn hours_ago(mut self, hours: i64) -> Self {
        self.event = self.event.with_timestamp(fixed_now() - Duration::hours(hours));
        self
    }

    pub fn days_ago(mut self, days: i64) -> Self {
        self.event = self.event.with_timestamp(fixed_now() - Duration::days(days));
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        let (low, _) = severity.risk_band();
        self.event = self.event.with_severity(severity).with_risk_score(low);
        self
    }

    pub fn risk(mut self, risk: u8) -> Self {
        self.event = self.event.with_risk_score(risk);
        self
    }

    pub fn user(mut self, username: &str) -> Self {
        self.event = self.event.with_username(username);
        self
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.event = self.event.with_ip(ip);
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.event = self.event.with_location(location);
        self
    }

    pub fn build(self) -> SecurityEvent {
        self.event
    }
}

/// Common test event factories with descriptive names
pub mod events {
    use super::*;

    pub fn admin_failed_login_an_hour_ago() -> SecurityEvent {
        SecurityEventBuilder::new(1, EventType::FailedLogin)
            .hours_ago(1)
            .severity(Severity::High)
            .user("admin")
            .ip("10.0.0.5")
            .build()
    }

    pub fn operator_failed_login_three_days_ago() -> SecurityEvent {
        SecurityEventBuilder::new(2, EventType::FailedLogin)
            .days_ago(3)
            .severity(Severity::Medium)
            .user("sat.operator")
            .ip("10.0.0.6")
            .build()
    }

    pub fn malware_from_abroad_two_days_ago() -> SecurityEvent {
        SecurityEventBuilder::new(3, EventType::MalwareDetection)
            .days_ago(2)
            .severity(Severity::High)
            .risk(92)
            .user("john.doe")
            .ip("172.16.4.20")
            .location("Beijing, CN")
            .build()
    }

    pub fn old_malware_twenty_days_ago() -> SecurityEvent {
        SecurityEventBuilder::new(4, EventType::MalwareDetection)
            .days_ago(20)
            .severity(Severity::High)
            .user("jane.smith")
            .build()
    }

    pub fn vpn_connection_this_morning() -> SecurityEvent {
        SecurityEventBuilder::new(5, EventType::VpnConnection)
            .hours_ago(3)
            .severity(Severity::Low)
            .user("mission.control")
            .build()
    }

    pub fn ground_station_access_yesterday() -> SecurityEvent {
        SecurityEventBuilder::new(6, EventType::GroundStationAccess)
            .hours_ago(20)
            .severity(Severity::Medium)
            .user("ground.station")
            .build()
    }

    /// Mixed, newest-first list covering every filter dimension.
    pub fn mixed() -> Vec<SecurityEvent> {
        vec![
            admin_failed_login_an_hour_ago(),
            vpn_connection_this_morning(),
            ground_station_access_yesterday(),
            malware_from_abroad_two_days_ago(),
            operator_failed_login_three_days_ago(),
            old_malware_twenty_days_ago(),
        ]
    }
}

/// Seeded configuration with no processing delay.
pub fn seeded_config(count: usize, seed: u64) -> Configuration {
    Configuration::builder()
        .event_count(count)
        .seed(seed)
        .processing_delay_ms(0)
        .build()
        .unwrap()
}

pub fn seeded_dataset(count: usize, seed: u64) -> Dataset {
    Dataset::generate_at(&seeded_config(count, seed), fixed_now())
}
