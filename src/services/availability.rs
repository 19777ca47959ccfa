use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::services::scheduling::{close_time, open_time, SLOT_STEP_MINUTES};

#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: String,
    pub slots: Vec<String>,
}

/// Bookable start times for one barber across an inclusive date range.
/// Candidates step across the business window on the slot grid; a candidate
/// survives if its whole [start, end) fits the window and overlaps no
/// non-cancelled appointment.
pub fn enumerate(
    conn: &Connection,
    barber_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    duration_minutes: i32,
) -> anyhow::Result<Vec<DayAvailability>> {
    let mut days = vec![];
    let mut day = from;
    while day <= to {
        let day_open = day.and_time(open_time());
        let day_close = day.and_time(close_time());

        let busy = queries::appointments::get_busy_intervals(conn, barber_id, &day_open, &day_close)?;

        let mut slots = vec![];
        let mut candidate = day_open;
        loop {
            let end = candidate + Duration::minutes(duration_minutes as i64);
            if end > day_close {
                break;
            }
            if !overlaps_any(&busy, &candidate, &end) {
                slots.push(candidate.format("%H:%M").to_string());
            }
            candidate += Duration::minutes(SLOT_STEP_MINUTES);
        }

        days.push(DayAvailability {
            date: day.format("%Y-%m-%d").to_string(),
            slots,
        });

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(days)
}

fn overlaps_any(
    busy: &[(NaiveDateTime, NaiveDateTime)],
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> bool {
    busy.iter().any(|(s, e)| s < end && e > start)
}

// ── Cache ──

struct CacheEntry {
    expires_at: Instant,
    days: Vec<DayAvailability>,
}

/// Short-TTL cache for availability responses. Keys embed the barber id so
/// a write to one barber's appointments evicts only that barber's entries.
pub struct AvailabilityCache {
    ttl: StdDuration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl AvailabilityCache {
    pub fn new(ttl: StdDuration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn key(barber_id: &str, from: NaiveDate, to: NaiveDate, duration_minutes: i32) -> String {
        format!("{barber_id}|{from}|{to}|{duration_minutes}")
    }

    pub fn get(&self, key: &str) -> Option<Vec<DayAvailability>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.days.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, days: Vec<DayAvailability>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            CacheEntry {
                expires_at: Instant::now() + self.ttl,
                days,
            },
        );
    }

    /// Drop every cached range for a barber. Called from each appointment
    /// write path.
    pub fn invalidate_barber(&self, barber_id: &str) {
        let prefix = format!("{barber_id}|");
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|key, _| !key.starts_with(&prefix));
    }
}
