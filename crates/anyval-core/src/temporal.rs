//! # Temporal Normalization
//!
//! Converts any [`Value`] into an [`Instant`]: a UTC point in time with
//! nanosecond resolution.
//!
//! ## Dispatch Order
//!
//! 1. Instants pass through; an absent instant reference is the zero instant.
//! 2. Native integers are whole seconds since the Unix epoch. No magnitude
//!    guessing: a caller holding a typed integer knows its unit.
//! 3. Floats are seconds with a fractional nanosecond remainder.
//! 4. Text goes through the string algorithm below.
//! 5. Anything else is coerced to text first.
//!
//! ## String Algorithm
//!
//! With explicit formats, each is tried in order and nothing else is: a
//! miss on every format yields the zero instant even if the default table
//! would have matched. Without explicit formats the default table in
//! [`FormatRegistry`] is tried, then integer text with magnitude-based
//! unit inference (see [`TimeUnit::infer`]), then float seconds.
//!
//! The explicit `unix*` tokens are narrower than that fallback: they take
//! integer text only, so `"12.5"` under [`formats::UNIX`] fails while the
//! same text with no formats reads as 12.5 seconds.
//!
//! ## Zero Instant
//!
//! Failure yields `0001-01-01T00:00:00Z`, not the Unix epoch, so that a
//! legitimate `"0"` timestamp stays distinguishable from a parse failure.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::to_text;
use crate::error::{CoercionError, CoercionResult};
use crate::formats::{self, FormatRegistry};
use crate::value::Value;

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_MICRO: i64 = 1_000;
const MILLIS_PER_SEC: i64 = 1_000;
const MICROS_PER_SEC: i64 = 1_000_000;

/// Integer text above this is nanoseconds.
pub const NANOS_THRESHOLD: i64 = 1_000_000_000_000_000_000;
/// Integer text above this (up to [`NANOS_THRESHOLD`]) is microseconds.
pub const MICROS_THRESHOLD: i64 = 1_000_000_000_000_000;
/// Integer text above this (up to [`MICROS_THRESHOLD`]) is milliseconds.
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`.
const ZERO_UNIX_SECONDS: i64 = -62_135_596_800;

/// A UTC instant with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant(DateTime<Utc>);

impl Instant {
    /// The instant returned when normalization fails: `0001-01-01T00:00:00Z`.
    pub fn zero() -> Self {
        DateTime::from_timestamp(ZERO_UNIX_SECONDS, 0)
            .map(Self)
            .unwrap_or_default()
    }

    /// True for [`Instant::zero`].
    pub fn is_zero(&self) -> bool {
        self.0.timestamp() == ZERO_UNIX_SECONDS && self.0.timestamp_subsec_nanos() == 0
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Seconds plus a nanosecond adjustment of either sign.
    ///
    /// Nanoseconds outside `0..1e9` carry into the seconds. Returns `None`
    /// outside chrono's representable range.
    pub fn from_unix(secs: i64, nanos: i64) -> Option<Self> {
        let secs = secs.checked_add(nanos.div_euclid(NANOS_PER_SEC))?;
        let nanos = u32::try_from(nanos.rem_euclid(NANOS_PER_SEC)).ok()?;
        DateTime::from_timestamp(secs, nanos).map(Self)
    }

    /// Fractional seconds since the epoch, truncated toward zero at the
    /// second boundary with the remainder kept as nanoseconds.
    pub fn from_float_seconds(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.trunc();
        if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
            return None;
        }
        let nanos = ((secs - whole) * 1e9) as i64;
        Self::from_unix(whole as i64, nanos)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn subsec_nanos(&self) -> u32 {
        self.0.timestamp_subsec_nanos()
    }

    /// Count of `unit` since the epoch, truncated toward negative infinity.
    /// `None` when the count overflows `i64`.
    pub fn to_unix(&self, unit: TimeUnit) -> Option<i64> {
        let secs = self.unix_seconds();
        let nanos = i64::from(self.subsec_nanos());
        match unit {
            TimeUnit::Seconds => Some(secs),
            TimeUnit::Millis => secs
                .checked_mul(MILLIS_PER_SEC)?
                .checked_add(nanos / NANOS_PER_MILLI),
            TimeUnit::Micros => secs
                .checked_mul(MICROS_PER_SEC)?
                .checked_add(nanos / NANOS_PER_MICRO),
            TimeUnit::Nanos => secs.checked_mul(NANOS_PER_SEC)?.checked_add(nanos),
        }
    }

    /// RFC 3339 in UTC with `Z`, fractional digits only when non-zero.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl Default for Instant {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Unit of an integer epoch timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// Guess the unit of a bare integer from its magnitude.
    ///
    /// The boundaries are exclusive: exactly `10^12` is still seconds and
    /// exactly `10^18` is still microseconds.
    pub fn infer(n: i64) -> Self {
        if n > NANOS_THRESHOLD {
            Self::Nanos
        } else if n > MICROS_THRESHOLD {
            Self::Micros
        } else if n > MILLIS_THRESHOLD {
            Self::Millis
        } else {
            Self::Seconds
        }
    }

    /// The instant `n` units after the epoch.
    pub fn instant(self, n: i64) -> Option<Instant> {
        match self {
            Self::Seconds => Instant::from_unix(n, 0),
            Self::Millis => Instant::from_unix(n / MILLIS_PER_SEC, (n % MILLIS_PER_SEC) * NANOS_PER_MILLI),
            Self::Micros => Instant::from_unix(n / MICROS_PER_SEC, (n % MICROS_PER_SEC) * NANOS_PER_MICRO),
            Self::Nanos => Instant::from_unix(0, n),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Millis => "ms",
            Self::Micros => "us",
            Self::Nanos => "ns",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "seconds" => Ok(Self::Seconds),
            "ms" | "millis" => Ok(Self::Millis),
            "us" | "micros" => Ok(Self::Micros),
            "ns" | "nanos" => Ok(Self::Nanos),
            other => Err(format!("unknown time unit {other:?} (expected s, ms, us or ns)")),
        }
    }
}

/// Normalize `value` to an instant using the default format table.
pub fn to_instant(value: &Value) -> Instant {
    to_instant_with::<&str>(value, &[])
}

/// Normalize `value` to an instant, trying only `formats` for text input.
///
/// Returns [`Instant::zero`] on any failure.
pub fn to_instant_with<S: AsRef<str>>(value: &Value, formats: &[S]) -> Instant {
    try_to_instant_with(value, formats).unwrap_or_else(|err| {
        tracing::trace!(kind = %value.kind(), error = %err, "instant coercion fell back to zero");
        Instant::zero()
    })
}

/// Fallible [`to_instant`].
pub fn try_to_instant(value: &Value) -> CoercionResult<Instant> {
    try_to_instant_with::<&str>(value, &[])
}

/// Fallible [`to_instant_with`].
pub fn try_to_instant_with<S: AsRef<str>>(value: &Value, formats: &[S]) -> CoercionResult<Instant> {
    let unsupported = || CoercionError::UnsupportedKind {
        target: "instant",
        kind: value.kind(),
    };
    match value {
        Value::Instant(i) => Ok(*i),
        Value::InstantRef(Some(i)) => Ok(**i),
        Value::InstantRef(None) | Value::Null => Err(unsupported()),
        Value::I8(n) => from_seconds(i64::from(*n)),
        Value::I16(n) => from_seconds(i64::from(*n)),
        Value::I32(n) => from_seconds(i64::from(*n)),
        Value::I64(n) => from_seconds(*n),
        Value::U8(n) => from_seconds(i64::from(*n)),
        Value::U16(n) => from_seconds(i64::from(*n)),
        Value::U32(n) => from_seconds(i64::from(*n)),
        Value::U64(n) => {
            let secs = i64::try_from(*n).map_err(|_| CoercionError::OutOfRange(n.to_string()))?;
            from_seconds(secs)
        }
        Value::F32(f) => from_float(f64::from(*f)),
        Value::F64(f) => from_float(*f),
        Value::Text(s) => parse_text(s, formats),
        Value::Bool(_)
        | Value::ObjectId(_)
        | Value::Seq(_)
        | Value::Map(_)
        | Value::Record(_)
        | Value::Rendered(_) => {
            let text = to_text(value);
            if text.is_empty() {
                return Err(unsupported());
            }
            parse_text(&text, formats)
        }
    }
}

fn from_seconds(secs: i64) -> CoercionResult<Instant> {
    Instant::from_unix(secs, 0).ok_or_else(|| CoercionError::OutOfRange(format!("{secs}s")))
}

fn from_float(secs: f64) -> CoercionResult<Instant> {
    Instant::from_float_seconds(secs).ok_or_else(|| CoercionError::OutOfRange(format!("{secs}s")))
}

/// The string algorithm.
fn parse_text<S: AsRef<str>>(text: &str, formats: &[S]) -> CoercionResult<Instant> {
    let text = text.trim();
    let no_match = |tried: usize| CoercionError::NoMatchingFormat {
        input: text.to_string(),
        tried,
    };
    if text.is_empty() {
        return Err(no_match(0));
    }

    if !formats.is_empty() {
        return formats
            .iter()
            .find_map(|format| parse_explicit(text, format.as_ref()))
            .ok_or_else(|| no_match(formats.len()));
    }

    let registry = FormatRegistry::global();
    if let Some((format, instant)) = registry.parse(text) {
        tracing::trace!(format = format.name(), "matched default time format");
        return Ok(instant);
    }

    if let Ok(n) = text.parse::<i64>() {
        let unit = TimeUnit::infer(n);
        tracing::debug!(value = n, unit = %unit, "inferred epoch unit from magnitude");
        return unit
            .instant(n)
            .ok_or_else(|| CoercionError::OutOfRange(format!("{n}{unit}")));
    }

    if let Ok(f) = text.parse::<f64>() {
        return from_float(f);
    }

    Err(no_match(registry.len()))
}

fn parse_explicit(text: &str, format: &str) -> Option<Instant> {
    match formats::unit_for_token(format) {
        Some(unit) => text.parse::<i64>().ok().and_then(|n| unit.instant(n)),
        None => formats::parse_with_layout(text, format),
    }
}
