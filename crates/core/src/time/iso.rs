use anyhow::Context;
use chrono::{NaiveDateTime, SubsecRound, Timelike, Utc};

// Timestamps are written like Python's `datetime.isoformat()` on a naive UTC value:
// no timezone designator, microseconds only when non-zero.
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current UTC wall-clock time, truncated to microsecond precision.
pub fn utc_now_naive() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_iso_naive(dt: &NaiveDateTime) -> String {
    let base = dt.format(SECONDS_FORMAT).to_string();
    let micros = (dt.nanosecond() / 1_000) % 1_000_000;
    if micros == 0 {
        base
    } else {
        format!("{base}.{micros:06}")
    }
}

pub fn parse_iso_naive(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("invalid naive ISO-8601 timestamp: {s}"))
}

/// `#[serde(with = "crate::time::iso::naive")]` for `NaiveDateTime` fields.
pub mod naive {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_iso_naive(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_iso_naive(&s).map_err(serde::de::Error::custom)
    }
}
