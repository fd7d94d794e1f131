//! # Value Coercion
//!
//! Total conversions from any [`Value`] to text, integers, floats, booleans
//! and object identifiers. Each total function is its `try_*` twin with the
//! target's zero value substituted on error, so the two never disagree about
//! what counts as a successful conversion.
//!
//! Fallbacks are logged at `trace` level with the input kind, which is the
//! only way to tell a genuine zero from a failed parse after the fact.

use crate::canonical::CanonicalBytes;
use crate::error::{CoercionError, CoercionResult};
use crate::identity::ObjectId;
use crate::value::Value;

/// Tokens read as `true`, after trimming and lower-casing.
const TRUE_TOKENS: &[&str] = &["true", "t", "yes", "y", "on", "1"];
/// Tokens read as `false`. Checked after [`TRUE_TOKENS`].
const FALSE_TOKENS: &[&str] = &["false", "f", "no", "n", "off", "0", ""];

/// Shortest round-trip decimal form, never in exponent notation.
pub(crate) fn format_f64(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { '+' } else { '-' };
        format!("{sign}Inf")
    } else {
        f.to_string()
    }
}

/// Like [`format_f64`], but shortest for `f32` precision.
pub(crate) fn format_f32(f: f32) -> String {
    if f.is_finite() {
        f.to_string()
    } else {
        format_f64(f64::from(f))
    }
}

/// Render any value as text.
///
/// Identifiers render as hex and self-rendering values as their own text
/// before structured values are considered; structured values become
/// canonical JSON, or a plain `[a b]` style rendering when they hold
/// something JSON cannot represent.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null | Value::InstantRef(None) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::I8(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::U8(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::F32(f) => format_f32(*f),
        Value::F64(f) => format_f64(*f),
        Value::Text(s) => s.clone(),
        Value::Instant(i) => i.to_rfc3339(),
        Value::InstantRef(Some(i)) => i.to_rfc3339(),
        Value::ObjectId(id) => id.to_hex(),
        Value::Rendered(r) => r.render(),
        Value::Seq(_) | Value::Map(_) | Value::Record(_) => match CanonicalBytes::from_value(value) {
            Ok(bytes) => bytes.into_string(),
            Err(err) => {
                tracing::trace!(kind = %value.kind(), error = %err, "canonical form unavailable, using plain rendering");
                value.to_string()
            }
        },
    }
}

/// Coerce to `i64`; 0 on failure.
pub fn to_integer(value: &Value) -> i64 {
    try_to_integer(value).unwrap_or_else(|err| fallback(value, &err, 0))
}

/// Fallible [`to_integer`].
///
/// Floats truncate toward zero and saturate at the `i64` bounds; unsigned
/// values above `i64::MAX` saturate. Text must be a plain base-10 integer
/// with an optional sign: no whitespace, no decimal point.
pub fn try_to_integer(value: &Value) -> CoercionResult<i64> {
    match value {
        Value::I8(n) => Ok(i64::from(*n)),
        Value::I16(n) => Ok(i64::from(*n)),
        Value::I32(n) => Ok(i64::from(*n)),
        Value::I64(n) => Ok(*n),
        Value::U8(n) => Ok(i64::from(*n)),
        Value::U16(n) => Ok(i64::from(*n)),
        Value::U32(n) => Ok(i64::from(*n)),
        Value::U64(n) => Ok(i64::try_from(*n).unwrap_or(i64::MAX)),
        Value::F32(f) => truncate(f64::from(*f)),
        Value::F64(f) => truncate(*f),
        Value::Text(s) => s
            .parse::<i64>()
            .map_err(|_| CoercionError::InvalidInteger(s.clone())),
        Value::Null
        | Value::Bool(_)
        | Value::Instant(_)
        | Value::InstantRef(_)
        | Value::ObjectId(_)
        | Value::Seq(_)
        | Value::Map(_)
        | Value::Record(_)
        | Value::Rendered(_) => Err(CoercionError::UnsupportedKind {
            target: "integer",
            kind: value.kind(),
        }),
    }
}

fn truncate(f: f64) -> CoercionResult<i64> {
    if f.is_finite() {
        // `as` truncates toward zero and saturates.
        Ok(f as i64)
    } else {
        Err(CoercionError::OutOfRange(format_f64(f)))
    }
}

/// Coerce to `f64` without rounding; 0.0 on failure.
pub fn to_float(value: &Value) -> f64 {
    try_to_float(value).unwrap_or_else(|err| fallback(value, &err, 0.0))
}

/// Fallible [`to_float`].
pub fn try_to_float(value: &Value) -> CoercionResult<f64> {
    match value {
        Value::F64(f) => Ok(*f),
        Value::F32(f) => Ok(f64::from(*f)),
        Value::I8(n) => Ok(f64::from(*n)),
        Value::I16(n) => Ok(f64::from(*n)),
        Value::I32(n) => Ok(f64::from(*n)),
        Value::I64(n) => Ok(*n as f64),
        Value::U8(n) => Ok(f64::from(*n)),
        Value::U16(n) => Ok(f64::from(*n)),
        Value::U32(n) => Ok(f64::from(*n)),
        Value::U64(n) => Ok(*n as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => parse_float(s),
        Value::Null => Err(CoercionError::UnsupportedKind {
            target: "float",
            kind: value.kind(),
        }),
        Value::Instant(_)
        | Value::InstantRef(_)
        | Value::ObjectId(_)
        | Value::Seq(_)
        | Value::Map(_)
        | Value::Record(_)
        | Value::Rendered(_) => parse_float(&to_text(value)),
    }
}

fn parse_float(s: &str) -> CoercionResult<f64> {
    s.parse::<f64>()
        .map_err(|_| CoercionError::InvalidFloat(s.to_string()))
}

/// Coerce to `bool`; false on failure.
pub fn to_boolean(value: &Value) -> bool {
    try_to_boolean(value).unwrap_or_else(|err| fallback(value, &err, false))
}

/// Fallible [`to_boolean`].
///
/// Numbers are true when nonzero. Text is matched against the token tables,
/// then read as a number. Every other kind is true unless it is its type's
/// zero value (see [`Value::is_zero`]).
pub fn try_to_boolean(value: &Value) -> CoercionResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::I8(n) => Ok(*n != 0),
        Value::I16(n) => Ok(*n != 0),
        Value::I32(n) => Ok(*n != 0),
        Value::I64(n) => Ok(*n != 0),
        Value::U8(n) => Ok(*n != 0),
        Value::U16(n) => Ok(*n != 0),
        Value::U32(n) => Ok(*n != 0),
        Value::U64(n) => Ok(*n != 0),
        Value::F32(f) => Ok(*f != 0.0),
        Value::F64(f) => Ok(*f != 0.0),
        Value::Text(s) => parse_bool(s),
        Value::Null
        | Value::Instant(_)
        | Value::InstantRef(_)
        | Value::ObjectId(_)
        | Value::Seq(_)
        | Value::Map(_)
        | Value::Record(_)
        | Value::Rendered(_) => Ok(!value.is_zero()),
    }
}

fn parse_bool(s: &str) -> CoercionResult<bool> {
    let token = s.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        return Ok(true);
    }
    if FALSE_TOKENS.contains(&token.as_str()) {
        return Ok(false);
    }
    token
        .parse::<f64>()
        .map(|n| n != 0.0)
        .map_err(|_| CoercionError::UnrecognizedBoolean(s.to_string()))
}

/// Coerce to an [`ObjectId`] via its hex text; [`ObjectId::ZERO`] on failure.
pub fn to_object_id(value: &Value) -> ObjectId {
    try_to_object_id(value).unwrap_or_else(|err| fallback(value, &err, ObjectId::ZERO))
}

/// Fallible [`to_object_id`].
pub fn try_to_object_id(value: &Value) -> CoercionResult<ObjectId> {
    match value {
        Value::ObjectId(id) => Ok(*id),
        other => ObjectId::from_hex(&to_text(other)),
    }
}

fn fallback<T>(value: &Value, err: &CoercionError, zero: T) -> T {
    tracing::trace!(kind = %value.kind(), error = %err, "coercion fell back to zero value");
    zero
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::temporal::Instant;
    use crate::value::{Record, Rendered};

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    // ---- to_text ----

    #[test]
    fn text_of_null_is_empty() {
        assert_eq!(to_text(&Value::Null), "");
        assert_eq!(to_text(&Value::InstantRef(None)), "");
    }

    #[test]
    fn text_of_integers() {
        assert_eq!(to_text(&Value::I8(-128)), "-128");
        assert_eq!(to_text(&Value::U64(u64::MAX)), "18446744073709551615");
        assert_eq!(to_text(&Value::I64(i64::MIN)), "-9223372036854775808");
    }

    #[test]
    fn text_of_floats_is_shortest_without_exponent() {
        assert_eq!(to_text(&Value::F64(1.0)), "1");
        assert_eq!(to_text(&Value::F64(0.1)), "0.1");
        assert_eq!(to_text(&Value::F64(1e21)), "1000000000000000000000");
        assert_eq!(to_text(&Value::F64(1.5e-7)), "0.00000015");
        assert_eq!(to_text(&Value::F32(0.1)), "0.1");
        assert_eq!(to_text(&Value::F64(-0.0)), "-0");
    }

    #[test]
    fn text_of_non_finite_floats() {
        assert_eq!(to_text(&Value::F64(f64::NAN)), "NaN");
        assert_eq!(to_text(&Value::F64(f64::INFINITY)), "+Inf");
        assert_eq!(to_text(&Value::F32(f32::NEG_INFINITY)), "-Inf");
    }

    #[test]
    fn text_of_bool_and_id() {
        assert_eq!(to_text(&Value::Bool(true)), "true");
        let id = ObjectId::from_hex("65a1b2c3d4e5f60718293a4b").unwrap();
        assert_eq!(to_text(&Value::ObjectId(id)), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn text_of_instant_is_rfc3339() {
        let i = Instant::from_unix(0, 0).unwrap();
        assert_eq!(to_text(&Value::Instant(i)), "1970-01-01T00:00:00Z");
        assert_eq!(to_text(&Value::from(Some(i))), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn rendered_wins_over_structure() {
        let v = Value::Rendered(Rendered::new("custom"));
        assert_eq!(to_text(&v), "custom");
    }

    #[test]
    fn structured_values_render_as_canonical_json() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::from(2i32));
        map.insert("a".to_string(), Value::Seq(vec![Value::from(1.5f64), Value::Null]));
        assert_eq!(to_text(&Value::Map(map)), r#"{"a":[1.5,null],"b":2}"#);

        let rec = Record::new("User").field("name", "ann").field("age", 30u8);
        assert_eq!(to_text(&Value::Record(rec)), r#"{"age":30,"name":"ann"}"#);
    }

    #[test]
    fn unserializable_structure_uses_plain_rendering() {
        let v = Value::Seq(vec![Value::from(1i32), Value::F64(f64::NAN)]);
        assert_eq!(to_text(&v), "[1 NaN]");
    }

    // ---- to_integer ----

    #[test]
    fn integer_truncates_toward_zero() {
        assert_eq!(to_integer(&Value::F64(2.9)), 2);
        assert_eq!(to_integer(&Value::F64(-2.9)), -2);
        assert_eq!(to_integer(&Value::F32(7.99)), 7);
    }

    #[test]
    fn integer_widths_pass_through() {
        assert_eq!(to_integer(&Value::I8(-5)), -5);
        assert_eq!(to_integer(&Value::U32(u32::MAX)), i64::from(u32::MAX));
        assert_eq!(to_integer(&Value::U64(u64::MAX)), i64::MAX);
    }

    #[test]
    fn integer_text_is_strict() {
        assert_eq!(to_integer(&text("42")), 42);
        assert_eq!(to_integer(&text("-42")), -42);
        assert_eq!(to_integer(&text("+42")), 42);
        assert_eq!(to_integer(&text(" 42")), 0);
        assert_eq!(to_integer(&text("42 ")), 0);
        assert_eq!(to_integer(&text("4.2")), 0);
        assert_eq!(to_integer(&text("42abc")), 0);
        assert_eq!(to_integer(&text("")), 0);
        assert_eq!(to_integer(&text("99999999999999999999")), 0);
    }

    #[test]
    fn integer_of_other_kinds_is_zero() {
        assert_eq!(to_integer(&Value::Bool(true)), 0);
        assert_eq!(to_integer(&Value::Null), 0);
        assert_eq!(to_integer(&Value::Seq(vec![Value::from(1i32)])), 0);
        assert!(matches!(
            try_to_integer(&Value::Bool(true)),
            Err(CoercionError::UnsupportedKind { target: "integer", .. })
        ));
    }

    #[test]
    fn integer_of_non_finite_float_is_zero() {
        assert_eq!(to_integer(&Value::F64(f64::NAN)), 0);
        assert_eq!(to_integer(&Value::F64(f64::INFINITY)), 0);
        assert_eq!(to_integer(&Value::F64(1e300)), i64::MAX);
    }

    #[test]
    fn try_integer_distinguishes_zero_from_failure() {
        assert_eq!(try_to_integer(&text("0")), Ok(0));
        assert_eq!(
            try_to_integer(&text("zero")),
            Err(CoercionError::InvalidInteger("zero".to_string()))
        );
    }

    // ---- to_float ----

    #[test]
    fn float_conversions() {
        assert_eq!(to_float(&Value::I32(3)), 3.0);
        assert_eq!(to_float(&Value::F32(0.5)), 0.5);
        assert_eq!(to_float(&text("2.345")), 2.345);
        assert_eq!(to_float(&text("1e3")), 1000.0);
        assert_eq!(to_float(&text(" 1.0")), 0.0);
        assert_eq!(to_float(&text("abc")), 0.0);
        assert_eq!(to_float(&Value::Bool(true)), 1.0);
        assert_eq!(to_float(&Value::Bool(false)), 0.0);
        assert_eq!(to_float(&Value::Null), 0.0);
    }

    #[test]
    fn float_of_rendered_goes_through_text() {
        assert_eq!(to_float(&Value::Rendered(Rendered::new(12.25))), 12.25);
        assert_eq!(to_float(&Value::Seq(vec![])), 0.0);
    }

    // ---- to_boolean ----

    #[test]
    fn boolean_token_table() {
        for t in ["true", "T", "YES", "y", "On", "1", "  yes  "] {
            assert!(to_boolean(&text(t)), "{t:?} should be true");
        }
        for f in ["false", "F", "no", "N", "Off", "0", "", "   "] {
            assert!(!to_boolean(&text(f)), "{f:?} should be false");
        }
    }

    #[test]
    fn boolean_numeric_fallback() {
        assert!(to_boolean(&text("3.14")));
        assert!(to_boolean(&text("-2")));
        assert!(!to_boolean(&text("0.0")));
        assert!(!to_boolean(&text("maybe")));
        assert!(try_to_boolean(&text("maybe")).is_err());
    }

    #[test]
    fn boolean_of_numbers() {
        assert!(to_boolean(&Value::I64(-1)));
        assert!(!to_boolean(&Value::U16(0)));
        assert!(to_boolean(&Value::F64(0.001)));
        assert!(!to_boolean(&Value::F32(0.0)));
    }

    #[test]
    fn boolean_of_other_kinds_uses_zero_check() {
        assert!(!to_boolean(&Value::Null));
        assert!(!to_boolean(&Value::Seq(vec![])));
        assert!(to_boolean(&Value::Seq(vec![Value::Null])));
        assert!(!to_boolean(&Value::Map(BTreeMap::new())));
        assert!(!to_boolean(&Value::Record(Record::new("P").field("x", 0i32))));
        assert!(to_boolean(&Value::Record(Record::new("P").field("x", 1i32))));
        assert!(!to_boolean(&Value::Instant(Instant::zero())));
        assert!(to_boolean(&Value::from(Some(Instant::zero()))));
        assert!(!to_boolean(&Value::ObjectId(ObjectId::ZERO)));
    }

    // ---- to_object_id ----

    #[test]
    fn object_id_from_text() {
        let id = to_object_id(&text("65a1b2c3d4e5f60718293a4b"));
        assert_eq!(id.to_hex(), "65a1b2c3d4e5f60718293a4b");
        assert_eq!(to_object_id(&Value::ObjectId(id)), id);
    }

    #[test]
    fn object_id_failure_is_zero() {
        assert!(to_object_id(&text("nope")).is_zero());
        assert!(to_object_id(&Value::Null).is_zero());
        assert!(to_object_id(&Value::I64(5)).is_zero());
    }

    // ---- round trips ----

    #[test]
    fn integer_text_round_trip() {
        for n in [0i64, 1, -1, i64::MAX, i64::MIN, 1_697_297_045] {
            assert_eq!(to_integer(&Value::from(to_text(&Value::I64(n)))), n);
        }
    }

    #[test]
    fn float_text_round_trip() {
        for f in [0.1f64, -2.5, 1e-300, 1.7976931348623157e308, 123456.789] {
            assert_eq!(to_float(&Value::from(to_text(&Value::F64(f)))), f);
        }
    }
}
