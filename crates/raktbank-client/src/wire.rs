//! JSON shape adapters
//!
//! The collaborator endpoints receive exactly what the registration forms
//! submit: absent optional fields travel as `""` and times as `HH:MM`.

use chrono::NaiveTime;
use serde::Serializer;

const TIME_FORMAT: &str = "%H:%M";

/// Parse a time-of-day as `HH:MM`, falling back to `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Blank form fields come back as `None`.
pub fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn empty_if_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

pub fn time_or_empty<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
        None => serializer.serialize_str(""),
    }
}
