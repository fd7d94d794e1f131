//! # Time Formats — Layout Constants and the Default Table
//!
//! Layouts are chrono `strftime` strings. Two conventions apply on top of
//! chrono's own parser:
//!
//! - `%z` and `%:z` also accept a bare `Z` for UTC, so one layout covers
//!   both `2024-10-14T15:04:05Z` and `2024-10-14T15:04:05+07:00`.
//! - Fields a layout does not mention take fixed defaults: a missing date
//!   is `0000-01-01`, a missing time is midnight, a missing offset is UTC.
//!
//! Parsing is stricter than chrono in two places and looser in one:
//!
//! - Zero-padded fields are fixed width. `%m`, `%d` and `%H` need two digits
//!   and `%Y` needs four, so `20241` can never read as a compact date. Use
//!   `%-d` for a day written without padding, as [`DATE_LONG`] does.
//! - `%Z` reads a zone abbreviation such as `MST` and ignores it. A numeric
//!   offset in that position fails the layout, leaving it to the `%z` twin.
//! - `%S` accepts an optional fraction of any precision, so
//!   `2024-10-14T15:04:05.5` matches [`DATE_TIME_T`].
//!
//! ## Table Order
//!
//! [`FormatRegistry::global`] tries its layouts strictly in declaration
//! order and the first successful parse wins. Several layouts accept the
//! same digit shape (`01/02/2006` is valid month-first and day-first), so
//! the order *is* the disambiguation rule: month-first [`DATE_US`] sits
//! before day-first [`DATE_EU`]. Downstream data depends on this order;
//! new layouts are appended, never inserted.
//!
//! ## Pseudo-formats
//!
//! [`UNIX`], [`UNIX_MILLI`], [`UNIX_MICRO`] and [`UNIX_NANO`] are not layouts.
//! In an explicit format list they parse the text as an integer count of the
//! named unit since the Unix epoch.

use std::iter;
use std::sync::OnceLock;

use chrono::format::{
    self, Fixed, Item, Numeric, Pad, ParseErrorKind, ParseResult, Parsed, StrftimeItems,
};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::temporal::{Instant, TimeUnit};

// ---- Standard formats ----

/// ISO 8601 / RFC 3339, whole seconds.
pub const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";
/// RFC 3339 with optional fractional seconds.
pub const RFC3339_NANO: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";
pub const RFC822: &str = "%d %b %y %H:%M %Z";
pub const RFC822Z: &str = "%d %b %y %H:%M %z";
pub const RFC850: &str = "%A, %d-%b-%y %H:%M:%S %Z";
pub const RFC1123: &str = "%a, %d %b %Y %H:%M:%S %Z";
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";
/// `Mon Jan  2 15:04:05 2006`
pub const ANSIC: &str = "%a %b %e %H:%M:%S %Y";
/// `Mon Jan  2 15:04:05 MST 2006`
pub const UNIX_DATE: &str = "%a %b %e %H:%M:%S %Z %Y";
/// `Mon Jan 02 15:04:05 -0700 2006`
pub const RUBY_DATE: &str = "%a %b %d %H:%M:%S %z %Y";

// ---- Date-time formats ----

/// `YYYY-MM-DD HH:MM:SS`
pub const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
/// `YYYY-MM-DD HH:MM:SS -0700`
pub const DATE_TIME_WITH_TZ: &str = "%Y-%m-%d %H:%M:%S %z";
/// `YYYY-MM-DD HH:MM:SS.mmm`
pub const DATE_TIME_MILLI: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// `YYYY-MM-DD HH:MM:SS.uuuuuu`
pub const DATE_TIME_MICRO: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// `YYYY-MM-DD HH:MM:SS.nnnnnnnnn`
pub const DATE_TIME_NANO: &str = "%Y-%m-%d %H:%M:%S%.9f";
/// `YYYY-MM-DDTHH:MM:SS`
pub const DATE_TIME_T: &str = "%Y-%m-%dT%H:%M:%S";
/// `YYYY-MM-DDTHH:MM:SS.mmm`
pub const DATE_TIME_T_MILLI: &str = "%Y-%m-%dT%H:%M:%S%.3f";
/// `YYYY-MM-DDTHH:MM:SSZ`
pub const DATE_TIME_TZ: &str = "%Y-%m-%dT%H:%M:%SZ";
/// `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub const DATE_TIME_T_MILLI_Z: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
/// `YYYY-MM-DDTHH:MM:SS.uuuuuuZ`
pub const DATE_TIME_T_MICRO_Z: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
/// `YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`
pub const DATE_TIME_T_NANO_Z: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";
/// `YYYY-MM-DDTHH:MM:SS-07:00`
pub const DATE_TIME_T_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%:z";

// ---- Date-only formats ----

/// `YYYY-MM-DD`
pub const DATE: &str = "%Y-%m-%d";
/// `YYYY/MM/DD`
pub const DATE_SLASH: &str = "%Y/%m/%d";
/// `YYYY.MM.DD`
pub const DATE_DOT: &str = "%Y.%m.%d";
/// `MM/DD/YYYY`
pub const DATE_US: &str = "%m/%d/%Y";
/// `MM-DD-YYYY`
pub const DATE_US_DASH: &str = "%m-%d-%Y";
/// `DD/MM/YYYY`
pub const DATE_EU: &str = "%d/%m/%Y";
/// `DD-MM-YYYY`
pub const DATE_EU_DASH: &str = "%d-%m-%Y";
/// `YYYYMMDD`
pub const DATE_COMPACT: &str = "%Y%m%d";
/// `02 Jan 2006`
pub const DATE_READABLE: &str = "%d %b %Y";
/// `January 2, 2006`
pub const DATE_LONG: &str = "%B %-d, %Y";

// ---- Time-only formats ----

pub const TIME: &str = "%H:%M:%S";
pub const TIME_MILLI: &str = "%H:%M:%S%.3f";
pub const TIME_MICRO: &str = "%H:%M:%S%.6f";
pub const TIME_SHORT: &str = "%H:%M";
/// `03:04:05 PM`
pub const TIME_12_HOUR: &str = "%I:%M:%S %p";
/// `03:04 PM`
pub const TIME_12: &str = "%I:%M %p";

// ---- Unix pseudo-formats ----

pub const UNIX: &str = "unix";
pub const UNIX_MILLI: &str = "unix-milli";
pub const UNIX_MICRO: &str = "unix-micro";
pub const UNIX_NANO: &str = "unix-nano";

/// The default table, in priority order.
const DEFAULT_TABLE: &[(&str, &str)] = &[
    ("rfc3339", RFC3339),
    ("rfc3339_nano", RFC3339_NANO),
    ("date_time", DATE_TIME),
    ("date_time_t", DATE_TIME_T),
    ("date_time_tz", DATE_TIME_TZ),
    ("date_time_t_milli_z", DATE_TIME_T_MILLI_Z),
    ("date_time_t_micro_z", DATE_TIME_T_MICRO_Z),
    ("date_time_t_nano_z", DATE_TIME_T_NANO_Z),
    ("date_time_t_offset", DATE_TIME_T_OFFSET),
    ("date_time_milli", DATE_TIME_MILLI),
    ("date_time_micro", DATE_TIME_MICRO),
    ("date_time_nano", DATE_TIME_NANO),
    ("date", DATE),
    ("date_slash", DATE_SLASH),
    ("date_us", DATE_US),
    ("date_eu", DATE_EU),
    ("date_compact", DATE_COMPACT),
    ("date_readable", DATE_READABLE),
    ("date_long", DATE_LONG),
    ("rfc1123", RFC1123),
    ("rfc1123z", RFC1123Z),
    ("rfc822", RFC822),
    ("rfc822z", RFC822Z),
    ("rfc850", RFC850),
    ("ansic", ANSIC),
    ("unix_date", UNIX_DATE),
    ("ruby_date", RUBY_DATE),
    // Appended after the mail-header layouts so they cannot shadow them.
    ("date_time_with_tz", DATE_TIME_WITH_TZ),
    ("date_time_t_milli", DATE_TIME_T_MILLI),
    ("date_dot", DATE_DOT),
    ("date_us_dash", DATE_US_DASH),
    ("date_eu_dash", DATE_EU_DASH),
    ("time", TIME),
    ("time_milli", TIME_MILLI),
    ("time_micro", TIME_MICRO),
    ("time_short", TIME_SHORT),
    ("time_12_hour", TIME_12_HOUR),
    ("time_12", TIME_12),
];

/// Map a pseudo-format token to its epoch unit.
pub fn unit_for_token(format: &str) -> Option<TimeUnit> {
    match format {
        UNIX => Some(TimeUnit::Seconds),
        UNIX_MILLI => Some(TimeUnit::Millis),
        UNIX_MICRO => Some(TimeUnit::Micros),
        UNIX_NANO => Some(TimeUnit::Nanos),
        _ => None,
    }
}

/// A named, pre-compiled layout.
#[derive(Debug)]
pub struct TimeFormat {
    name: &'static str,
    layout: &'static str,
    items: Vec<Item<'static>>,
}

impl TimeFormat {
    fn compile(name: &'static str, layout: &'static str) -> Self {
        Self {
            name,
            layout,
            items: compile(layout),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn layout(&self) -> &'static str {
        self.layout
    }

    /// Parse `text` with this layout.
    pub fn parse(&self, text: &str) -> Option<Instant> {
        parse_items(text, &self.items)
    }
}

/// The ordered, immutable table of default layouts.
///
/// Built once on first use and shared read-only afterwards.
#[derive(Debug)]
pub struct FormatRegistry {
    formats: Vec<TimeFormat>,
}

static REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

impl FormatRegistry {
    /// The process-wide default table.
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(Self::builtin)
    }

    fn builtin() -> Self {
        Self {
            formats: DEFAULT_TABLE
                .iter()
                .map(|&(name, layout)| TimeFormat::compile(name, layout))
                .collect(),
        }
    }

    /// Layouts in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &TimeFormat> {
        self.formats.iter()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Look up a layout by name.
    pub fn get(&self, name: &str) -> Option<&TimeFormat> {
        self.formats.iter().find(|f| f.name == name)
    }

    /// First layout in table order that parses `text`.
    pub fn parse(&self, text: &str) -> Option<(&TimeFormat, Instant)> {
        self.formats
            .iter()
            .find_map(|format| format.parse(text).map(|instant| (format, instant)))
    }
}

/// Parse `text` with an arbitrary `strftime` layout.
pub fn parse_with_layout(text: &str, layout: &str) -> Option<Instant> {
    parse_items(text, &compile(layout))
}

/// Seconds always admit an optional fraction, so `%S` also reads `05.25`.
fn compile(layout: &str) -> Vec<Item<'_>> {
    let mut items = Vec::new();
    let mut source = StrftimeItems::new(layout).map(accept_zulu).peekable();
    while let Some(item) = source.next() {
        let seconds = matches!(item, Item::Numeric(Numeric::Second, _));
        items.push(item);
        if seconds && !source.peek().is_some_and(is_fraction) {
            items.push(Item::Fixed(Fixed::Nanosecond));
        }
    }
    items
}

fn is_fraction(item: &Item<'_>) -> bool {
    matches!(
        item,
        Item::Fixed(
            Fixed::Nanosecond
                | Fixed::Nanosecond3
                | Fixed::Nanosecond6
                | Fixed::Nanosecond9
                | Fixed::Internal(_)
        )
    )
}

/// Widen numeric offset items so they also accept `Z`.
fn accept_zulu(item: Item<'_>) -> Item<'_> {
    match item {
        Item::Fixed(Fixed::TimezoneOffset) => Item::Fixed(Fixed::TimezoneOffsetZ),
        Item::Fixed(Fixed::TimezoneOffsetColon) => Item::Fixed(Fixed::TimezoneOffsetColonZ),
        other => other,
    }
}

fn parse_items(text: &str, items: &[Item<'_>]) -> Option<Instant> {
    let mut parsed = Parsed::new();
    let mut rest = text;
    for item in items {
        rest = match item {
            Item::Fixed(Fixed::TimezoneName) => skip_zone_name(rest)?,
            Item::Numeric(numeric, Pad::Zero) if leading_digits(rest) < fixed_width(numeric) => {
                return None
            }
            _ => format::parse_and_remainder(&mut parsed, rest, iter::once(item)).ok()?,
        };
    }
    if !rest.is_empty() {
        return None;
    }
    resolve(&parsed)
}

/// Zero-padded fields must be written at full width: `01`, not `1`.
fn fixed_width(numeric: &Numeric) -> usize {
    match numeric {
        Numeric::Year | Numeric::IsoYear => 4,
        Numeric::Ordinal => 3,
        Numeric::Timestamp | Numeric::Nanosecond => 1,
        _ => 2,
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Skip a zone abbreviation such as `MST`. Numeric offsets are not names.
fn skip_zone_name(s: &str) -> Option<&str> {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    match s.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(&s[end..]),
        _ => None,
    }
}

/// Assemble an instant from parsed fields, defaulting the ones absent.
fn resolve(parsed: &Parsed) -> Option<Instant> {
    let date = or_default(parsed.to_naive_date(), NaiveDate::from_ymd_opt(0, 1, 1)?)?;
    let time = or_default(parsed.to_naive_time(), NaiveTime::from_hms_opt(0, 0, 0)?)?;
    let offset = or_default(parsed.to_fixed_offset(), FixedOffset::east_opt(0)?)?;
    let local = NaiveDateTime::new(date, time);
    let utc = local.and_local_timezone(offset).single()?.with_timezone(&Utc);
    Some(Instant::from_utc(utc))
}

/// Missing fields take the default; inconsistent ones fail the layout.
fn or_default<T>(result: ParseResult<T>, default: T) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => Some(default),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(i: Instant) -> String {
        i.to_rfc3339()
    }

    #[test]
    fn registry_is_shared() {
        let a = FormatRegistry::global() as *const FormatRegistry;
        let b = FormatRegistry::global() as *const FormatRegistry;
        assert_eq!(a, b);
        assert_eq!(FormatRegistry::global().len(), DEFAULT_TABLE.len());
    }

    #[test]
    fn us_layout_precedes_eu_layout() {
        let reg = FormatRegistry::global();
        let pos = |name: &str| reg.iter().position(|f| f.name() == name).unwrap();
        assert!(pos("date_us") < pos("date_eu"));
        assert!(pos("rfc3339") < pos("date"));
    }

    #[test]
    fn names_are_unique() {
        let reg = FormatRegistry::global();
        for f in reg.iter() {
            assert_eq!(reg.iter().filter(|g| g.name() == f.name()).count(), 1);
        }
    }

    #[test]
    fn rfc3339_accepts_zulu_and_offset() {
        let z = parse_with_layout("2024-10-14T15:04:05Z", RFC3339).unwrap();
        assert_eq!(iso(z), "2024-10-14T15:04:05Z");
        let off = parse_with_layout("2024-10-14T22:04:05+07:00", RFC3339).unwrap();
        assert_eq!(off, z);
    }

    #[test]
    fn rfc3339_nano_keeps_fraction() {
        let i = parse_with_layout("2024-10-14T15:04:05.123456789Z", RFC3339_NANO).unwrap();
        assert_eq!(i.subsec_nanos(), 123_456_789);
    }

    #[test]
    fn date_only_is_midnight_utc() {
        let i = parse_with_layout("2024-10-14", DATE).unwrap();
        assert_eq!(iso(i), "2024-10-14T00:00:00Z");
    }

    #[test]
    fn time_only_lands_on_year_zero() {
        let i = parse_with_layout("15:04:05", TIME).unwrap();
        assert_eq!(i.as_datetime().format("%Y-%m-%d %H:%M:%S").to_string(), "0000-01-01 15:04:05");
    }

    #[test]
    fn twelve_hour_clock() {
        let i = parse_with_layout("03:04 PM", TIME_12).unwrap();
        assert_eq!(i.as_datetime().format("%H:%M").to_string(), "15:04");
    }

    #[test]
    fn numeric_offset_is_applied() {
        let i = parse_with_layout("Mon, 02 Jan 2006 15:04:05 -0700", RFC1123Z).unwrap();
        assert_eq!(iso(i), "2006-01-02T22:04:05Z");
    }

    #[test]
    fn long_month_name() {
        let i = parse_with_layout("January 2, 2006", DATE_LONG).unwrap();
        assert_eq!(iso(i), "2006-01-02T00:00:00Z");
    }

    #[test]
    fn long_form_accepts_padded_day() {
        let i = parse_with_layout("January 02, 2006", DATE_LONG).unwrap();
        assert_eq!(iso(i), "2006-01-02T00:00:00Z");
    }

    #[test]
    fn compact_date() {
        let i = parse_with_layout("20240229", DATE_COMPACT).unwrap();
        assert_eq!(iso(i), "2024-02-29T00:00:00Z");
    }

    #[test]
    fn padded_fields_are_fixed_width() {
        assert!(parse_with_layout("2024111", DATE_COMPACT).is_none());
        assert!(parse_with_layout("1000111", DATE_COMPACT).is_none());
        assert!(parse_with_layout("1/2/2006", DATE_US).is_none());
        assert!(parse_with_layout("2024-1-14", DATE).is_none());
        assert!(parse_with_layout("24-10-14", DATE).is_none());
        assert!(parse_with_layout("5:04:05", TIME).is_none());
    }

    #[test]
    fn zone_name_rejects_numeric_offset() {
        assert!(parse_with_layout("Mon, 02 Jan 2006 15:04:05 -0700", RFC1123).is_none());
        assert!(parse_with_layout("02 Jan 06 15:04 +0100", RFC822).is_none());
        assert!(parse_with_layout("Mon, 02 Jan 2006 15:04:05 ", RFC1123).is_none());
    }

    #[test]
    fn zone_name_is_ignored() {
        let i = parse_with_layout("Mon, 02 Jan 2006 15:04:05 MST", RFC1123).unwrap();
        assert_eq!(iso(i), "2006-01-02T15:04:05Z");
    }

    #[test]
    fn seconds_take_any_fraction() {
        let i = parse_with_layout("2024-10-14T15:04:05.5", DATE_TIME_T).unwrap();
        assert_eq!(i.subsec_nanos(), 500_000_000);
        let i = parse_with_layout("2024-10-14 15:04:05.123456789", DATE_TIME).unwrap();
        assert_eq!(i.subsec_nanos(), 123_456_789);
        let i = parse_with_layout("2024-10-14T15:04:05.25Z", DATE_TIME_TZ).unwrap();
        assert_eq!(i.subsec_nanos(), 250_000_000);
    }

    #[test]
    fn explicit_fraction_width_still_binds() {
        assert!(parse_with_layout("2024-10-14 15:04:05.12", DATE_TIME_MILLI).is_none());
        let i = parse_with_layout("2024-10-14 15:04:05.120", DATE_TIME_MILLI).unwrap();
        assert_eq!(i.subsec_nanos(), 120_000_000);
    }

    #[test]
    fn impossible_date_fails() {
        assert!(parse_with_layout("2023-02-29", DATE).is_none());
        assert!(parse_with_layout("13/45/2024", DATE_US).is_none());
    }

    #[test]
    fn trailing_input_fails() {
        assert!(parse_with_layout("2024-10-14 junk", DATE).is_none());
    }

    #[test]
    fn invalid_layout_fails_quietly() {
        assert!(parse_with_layout("2024", "%Q").is_none());
    }

    #[test]
    fn registry_parse_reports_matching_layout() {
        let (format, _) = FormatRegistry::global().parse("2024/10/14").unwrap();
        assert_eq!(format.name(), "date_slash");
        assert_eq!(format.layout(), DATE_SLASH);
    }

    #[test]
    fn pseudo_tokens() {
        assert_eq!(unit_for_token("unix"), Some(TimeUnit::Seconds));
        assert_eq!(unit_for_token("unix-milli"), Some(TimeUnit::Millis));
        assert_eq!(unit_for_token("unix-micro"), Some(TimeUnit::Micros));
        assert_eq!(unit_for_token("unix-nano"), Some(TimeUnit::Nanos));
        assert_eq!(unit_for_token("unix-pico"), None);
        assert_eq!(unit_for_token(DATE), None);
    }
}
