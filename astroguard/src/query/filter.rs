//! Intent filters and time windows.

use astroguard_common::SecurityEvent;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use log::warn;

use super::{Entities, TimeRange};

/// Time interval in UTC. `end` is inclusive unless `end_exclusive` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_exclusive: bool,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if *timestamp < self.start {
            return false;
        }
        if self.end_exclusive {
            *timestamp < self.end
        } else {
            *timestamp <= self.end
        }
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

impl TimeRange {
    pub fn duration(&self) -> Option<Duration> {
        match self {
            TimeRange::LastHour => Some(Duration::hours(1)),
            TimeRange::Last24Hours => Some(Duration::hours(24)),
            TimeRange::Last7Days => Some(Duration::days(7)),
            TimeRange::Last30Days => Some(Duration::days(30)),
            TimeRange::Yesterday | TimeRange::Today => None,
        }
    }

    /// Window covered by this range relative to `now`. Calendar ranges use
    /// `now`'s time zone; `yesterday` runs from the previous midnight up to,
    /// but excluding, today's midnight.
    ///
    /// Returns `None` only when a local midnight does not exist in the zone.
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<TimeWindow> {
        let now_utc = now.with_timezone(&Utc);
        let tz = now.timezone();
        let today = now.date_naive();

        let window = match self {
            TimeRange::Yesterday => TimeWindow {
                start: local_midnight(&tz, today.pred_opt()?)?,
                end: local_midnight(&tz, today)?,
                end_exclusive: true,
            },
            TimeRange::Today => TimeWindow {
                start: local_midnight(&tz, today)?,
                end: now_utc,
                end_exclusive: false,
            },
            rolling => TimeWindow {
                start: now_utc - rolling.duration()?,
                end: now_utc,
                end_exclusive: false,
            },
        };
        Some(window)
    }
}

/// Applies, in order, the type, time window, severity, username and ip
/// filters. Absent entities are skipped and input order is preserved.
pub fn filter_events<Tz: TimeZone>(
    events: &[SecurityEvent],
    entities: &Entities,
    now: &DateTime<Tz>,
) -> Vec<SecurityEvent> {
    let window = entities.time_range.and_then(|range| {
        let window = range.window(now);
        if window.is_none() {
            warn!("No local midnight for {}, skipping time filter", range);
        }
        window
    });
    let username = entities.username.as_ref().map(|u| u.to_lowercase());

    events
        .iter()
        .filter(|e| {
            entities
                .event_type
                .as_ref()
                .map_or(true, |types| types.contains(&e.event_type))
        })
        .filter(|e| window.map_or(true, |w| w.contains(&e.timestamp)))
        .filter(|e| {
            entities
                .severity
                .as_ref()
                .map_or(true, |severities| severities.contains(&e.severity))
        })
        .filter(|e| {
            username
                .as_ref()
                .map_or(true, |u| e.username.to_lowercase().contains(u.as_str()))
        })
        .filter(|e| {
            entities
                .ip
                .as_ref()
                .map_or(true, |ip| e.ip.contains(ip.as_str()))
        })
        .cloned()
        .collect()
}
