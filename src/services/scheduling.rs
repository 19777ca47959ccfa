use chrono::{Duration, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

/// Bookable window, identical for every shop and weekday.
pub const OPEN_HOUR: u32 = 8;
pub const CLOSE_HOUR: u32 = 20;
/// Candidate slot grid used by availability enumeration.
pub const SLOT_STEP_MINUTES: i64 = 30;

#[derive(Debug)]
pub enum SchedulingError {
    OutsideBusinessHours,
    Conflict,
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::OutsideBusinessHours => {
                write!(
                    f,
                    "that time is outside business hours ({OPEN_HOUR:02}:00-{CLOSE_HOUR:02}:00)"
                )
            }
            SchedulingError::Conflict => {
                write!(f, "that time slot is already booked for this barber")
            }
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::OutsideBusinessHours => AppError::validation("start_time", e.to_string()),
            SchedulingError::Conflict => AppError::Conflict(e.to_string()),
        }
    }
}

pub fn open_time() -> NaiveTime {
    NaiveTime::from_hms_opt(OPEN_HOUR, 0, 0).expect("valid opening time")
}

pub fn close_time() -> NaiveTime {
    NaiveTime::from_hms_opt(CLOSE_HOUR, 0, 0).expect("valid closing time")
}

/// Both the start and the computed end must fall inside the same day's
/// business window.
pub fn within_business_hours(start: &NaiveDateTime, duration_minutes: i32) -> bool {
    let end = *start + Duration::minutes(duration_minutes as i64);
    if start.time() < open_time() {
        return false;
    }
    // Ending exactly at close is fine; crossing midnight is not.
    if end.date() != start.date() {
        return false;
    }
    end.time() <= close_time() && start.time() < close_time()
}

/// The booking gate: business hours first, then the half-open overlap check
/// against the barber's non-cancelled appointments. `exclude_id` is set when
/// rescheduling in place.
pub fn check_slot(
    conn: &Connection,
    barber_id: &str,
    start: &NaiveDateTime,
    duration_minutes: i32,
    exclude_id: Option<&str>,
) -> Result<(), SchedulingError> {
    if !within_business_hours(start, duration_minutes) {
        return Err(SchedulingError::OutsideBusinessHours);
    }

    let end = *start + Duration::minutes(duration_minutes as i64);
    let conflict = queries::appointments::has_conflict(conn, barber_id, start, &end, exclude_id)
        .map_err(|_| SchedulingError::Conflict)?;
    if conflict {
        return Err(SchedulingError::Conflict);
    }

    Ok(())
}
