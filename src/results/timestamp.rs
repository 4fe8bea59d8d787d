//! Run timestamps as the result store reports them.
//!
//! The store hands out `YYYY-MM-DD HH:MM:SS` strings; JSON exports from other tools tend
//! to use ISO-8601 with a `T` separator. Both parse into the same [`Timestamp`], and
//! output always uses the store format so the dashboard can cut the date off at the
//! first space.
//!
//! Fractional seconds are accepted but truncated on parse, so two timestamps that
//! compare equal always serialize to the same string.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

pub type Timestamp = NaiveDateTime;

/// Format used for every serialized timestamp.
pub const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub fn parse(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    let raw = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(raw, STORE_FORMAT)
        .or_else(|err| {
            FALLBACK_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .ok_or(err)
        })
        .map(|ts| ts.with_nanosecond(0).unwrap_or(ts))
}

pub fn format(ts: &Timestamp) -> String {
    ts.format(STORE_FORMAT).to_string()
}

pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}
