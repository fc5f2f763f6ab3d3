//! Behaviour of the synthetic event generator and the shared dataset

mod test_helpers;

use std::collections::HashSet;

use astroguard::generator::EventGenerator;
use astroguard_common::{is_domestic, EventType, SecurityEvent, Severity};
use chrono::Duration;
use rand::{rngs::StdRng, SeedableRng};
use test_helpers::{fixed_now, seeded_config, seeded_dataset};

fn generate(count: usize, seed: u64) -> Vec<SecurityEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    EventGenerator::new().generate_with_rng(count, fixed_now(), &mut rng)
}

mod event_invariants {
    use super::*;

    #[test]
    fn should_keep_risk_score_within_severity_band() {
        for event in generate(2_000, 11) {
            let (low, high) = event.severity.risk_band();
            assert!(
                (low..=high).contains(&event.risk_score),
                "{} has risk {} outside {:?}",
                event.id,
                event.risk_score,
                (low, high)
            );
        }
    }

    #[test]
    fn should_flag_exactly_the_mission_critical_types() {
        for event in generate(2_000, 12) {
            assert_eq!(
                event.is_mission_critical,
                EventType::MISSION_CRITICAL.contains(&event.event_type)
            );
        }
    }

    #[test]
    fn should_fix_severity_for_deterministic_types() {
        for event in generate(2_000, 13) {
            match event.event_type {
                EventType::MalwareDetection
                | EventType::CommandControlAccess
                | EventType::SatelliteCommAnomaly => assert_eq!(event.severity, Severity::High),
                EventType::FirewallBlock => assert_eq!(event.severity, Severity::Medium),
                EventType::VpnConnection | EventType::SuccessfulLogin => {
                    assert_eq!(event.severity, Severity::Low)
                }
                _ => assert_ne!(event.severity, Severity::Low),
            }
        }
    }

    #[test]
    fn should_place_timestamps_inside_lookback_window() {
        let now = fixed_now();
        for event in generate(500, 14) {
            assert!(event.timestamp <= now);
            assert!(event.timestamp >= now - Duration::days(30));
        }
    }

    #[test]
    fn should_use_dotted_quads_below_255() {
        for event in generate(200, 15) {
            let octets: Vec<u8> = event
                .ip
                .split('.')
                .map(|part| part.parse().unwrap())
                .collect();
            assert_eq!(octets.len(), 4);
            assert!(octets.iter().all(|&octet| octet <= 254));
        }
    }

    #[test]
    fn should_attach_coordinates_from_location_table() {
        for event in generate(200, 16) {
            assert!(event.latitude.is_some());
            assert!(event.longitude.is_some());
        }
    }

    #[test]
    fn should_describe_malware_with_family() {
        let malware: Vec<_> = generate(1_000, 17)
            .into_iter()
            .filter(|e| e.event_type == EventType::MalwareDetection)
            .collect();

        assert!(!malware.is_empty());
        assert!(malware
            .iter()
            .all(|e| e.details.starts_with("Malware detected: ")));
    }
}

mod ordering_and_ids {
    use super::*;

    #[test]
    fn should_assign_unique_sequential_ids() {
        let events = generate(250, 21);

        let ids: HashSet<_> = events.iter().map(|e| e.id.clone()).collect();
        let expected: HashSet<_> = (1..=250).map(SecurityEvent::format_id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn should_sort_newest_first() {
        let events = generate(250, 22);

        assert!(events
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn should_return_nothing_for_zero_count() {
        assert!(generate(0, 23).is_empty());
    }
}

mod distribution {
    use super::*;

    #[test]
    fn should_favour_failed_logins() {
        let events = generate(5_000, 31);

        let failed = events
            .iter()
            .filter(|e| e.event_type == EventType::FailedLogin)
            .count();

        // 40 of 102 pool units
        let share = failed as f64 / events.len() as f64;
        assert!((0.34..0.45).contains(&share), "failed login share {}", share);
    }

    #[test]
    fn should_keep_most_traffic_domestic() {
        let events = generate(5_000, 32);

        let domestic = events.iter().filter(|e| is_domestic(&e.location)).count();

        let share = domestic as f64 / events.len() as f64;
        assert!((0.65..0.75).contains(&share), "domestic share {}", share);
    }
}

mod dataset {
    use super::*;

    #[test]
    fn should_reproduce_dataset_for_same_seed() {
        let first = seeded_dataset(100, 42);
        let second = seeded_dataset(100, 42);

        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn should_differ_between_seeds() {
        let first = seeded_dataset(100, 1);
        let second = seeded_dataset(100, 2);

        assert_ne!(first.events(), second.events());
    }

    #[test]
    fn should_honour_configured_count_and_clock() {
        let dataset = astroguard::Dataset::generate_at(&seeded_config(37, 5), fixed_now());

        assert_eq!(dataset.len(), 37);
        assert_eq!(dataset.generated_at(), fixed_now());
    }

    #[test]
    fn should_share_events_cheaply_between_clones() {
        let dataset = seeded_dataset(10, 3);
        let copy = dataset.clone();

        assert!(std::ptr::eq(dataset.events(), copy.events()));
    }
}
