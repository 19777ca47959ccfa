pub mod accounts;
pub mod appointments;
pub mod barbers;
pub mod barbershops;
pub mod customers;
pub mod landing;
pub mod services;

use chrono::{NaiveDateTime, Utc};

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn fmt_dt(dt: &NaiveDateTime) -> String {
    dt.format(DT_FORMAT).to_string()
}

pub(crate) fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DT_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

pub(crate) fn parse_opt_dt(s: Option<String>) -> Option<NaiveDateTime> {
    s.map(|v| parse_dt(&v))
}
