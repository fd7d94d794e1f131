//! # Opaque Input Values
//!
//! [`Value`] is the closed set of shapes the engine accepts. Every coercion
//! function matches on it exhaustively, so adding a variant forces each
//! conversion to decide what the new shape means.
//!
//! Integer widths stay distinguishable here even though every coercion
//! treats them alike; callers that report the dynamic kind (see
//! [`Value::kind`]) still see what they passed in.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::coerce::{format_f32, format_f64};
use crate::identity::ObjectId;
use crate::temporal::Instant;

/// A dynamically-typed input value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// UTF-8 text.
    Text(String),
    /// An already-normalized instant.
    Instant(Instant),
    /// An owned reference to an instant that may be absent.
    InstantRef(Option<Box<Instant>>),
    /// A 12-byte object identifier.
    ObjectId(ObjectId),
    /// Sequence or fixed-size array.
    Seq(Vec<Value>),
    /// String-keyed mapping.
    Map(BTreeMap<String, Value>),
    /// Named fields in declaration order.
    Record(Record),
    /// A value that renders itself to text.
    Rendered(Rendered),
}

/// The dynamic kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Text,
    Instant,
    InstantRef,
    ObjectId,
    Sequence,
    Mapping,
    Record,
    Rendered,
}

impl ValueKind {
    /// Stable lowercase name, used in error messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
            Self::Instant => "instant",
            Self::InstantRef => "instant_ref",
            Self::ObjectId => "object_id",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Record => "record",
            Self::Rendered => "rendered",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record: a type name plus named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// An empty record of the given type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

/// A value carrying its own text rendering.
///
/// Rendering takes priority over structural serialization when the value
/// is coerced to text.
#[derive(Clone)]
pub struct Rendered(Arc<dyn fmt::Display + Send + Sync>);

impl Rendered {
    pub fn new(inner: impl fmt::Display + Send + Sync + 'static) -> Self {
        Self(Arc::new(inner))
    }

    /// The value's own text form.
    pub fn render(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rendered").field(&self.render()).finish()
    }
}

impl PartialEq for Rendered {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl Value {
    /// The dynamic kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Text(_) => ValueKind::Text,
            Self::Instant(_) => ValueKind::Instant,
            Self::InstantRef(_) => ValueKind::InstantRef,
            Self::ObjectId(_) => ValueKind::ObjectId,
            Self::Seq(_) => ValueKind::Sequence,
            Self::Map(_) => ValueKind::Mapping,
            Self::Record(_) => ValueKind::Record,
            Self::Rendered(_) => ValueKind::Rendered,
        }
    }

    /// Whether this is its type's zero value.
    ///
    /// Empty sequences and mappings are zero; a record is zero when every
    /// field is; an instant reference is zero only when absent.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::I8(n) => *n == 0,
            Self::I16(n) => *n == 0,
            Self::I32(n) => *n == 0,
            Self::I64(n) => *n == 0,
            Self::U8(n) => *n == 0,
            Self::U16(n) => *n == 0,
            Self::U32(n) => *n == 0,
            Self::U64(n) => *n == 0,
            Self::F32(f) => *f == 0.0,
            Self::F64(f) => *f == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Instant(i) => i.is_zero(),
            Self::InstantRef(r) => r.is_none(),
            Self::ObjectId(id) => id.is_zero(),
            Self::Seq(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Record(rec) => rec.fields.iter().all(|(_, v)| v.is_zero()),
            Self::Rendered(r) => r.render().is_empty(),
        }
    }

    /// True for sequences, mappings and records.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Seq(_) | Self::Map(_) | Self::Record(_))
    }

    /// Build a value from anything serde can serialize, via its JSON form.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// First non-finite float anywhere in the value, if any.
    pub(crate) fn find_non_finite(&self) -> Option<f64> {
        match self {
            Self::F32(f) if !f.is_finite() => Some(f64::from(*f)),
            Self::F64(f) if !f.is_finite() => Some(*f),
            Self::Seq(items) => items.iter().find_map(Self::find_non_finite),
            Self::Map(map) => map.values().find_map(Self::find_non_finite),
            Self::Record(rec) => rec.fields.iter().find_map(|(_, v)| v.find_non_finite()),
            _ => None,
        }
    }
}

/// Plain rendering used when a structured value cannot be serialized.
///
/// Sequences render as `[a b]`, mappings as `map[k:v]`, records as `{a b}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::InstantRef(None) => f.write_str("<nil>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::I8(n) => write!(f, "{n}"),
            Self::I16(n) => write!(f, "{n}"),
            Self::I32(n) => write!(f, "{n}"),
            Self::I64(n) => write!(f, "{n}"),
            Self::U8(n) => write!(f, "{n}"),
            Self::U16(n) => write!(f, "{n}"),
            Self::U32(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            Self::F32(x) => f.write_str(&format_f32(*x)),
            Self::F64(x) => f.write_str(&format_f64(*x)),
            Self::Text(s) => f.write_str(s),
            Self::Instant(i) => write!(f, "{i}"),
            Self::InstantRef(Some(i)) => write!(f, "{i}"),
            Self::ObjectId(id) => write!(f, "{id}"),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("map[")?;
                for (idx, (k, v)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Self::Record(rec) => {
                f.write_str("{")?;
                for (idx, (_, v)) in rec.fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
            Self::Rendered(r) => f.write_str(&r.render()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::InstantRef(None) => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::I8(n) => serializer.serialize_i8(*n),
            Self::I16(n) => serializer.serialize_i16(*n),
            Self::I32(n) => serializer.serialize_i32(*n),
            Self::I64(n) => serializer.serialize_i64(*n),
            Self::U8(n) => serializer.serialize_u8(*n),
            Self::U16(n) => serializer.serialize_u16(*n),
            Self::U32(n) => serializer.serialize_u32(*n),
            Self::U64(n) => serializer.serialize_u64(*n),
            Self::F32(x) if x.is_finite() => serializer.serialize_f32(*x),
            Self::F64(x) if x.is_finite() => serializer.serialize_f64(*x),
            Self::F32(x) => Err(S::Error::custom(format!("non-finite float: {x}"))),
            Self::F64(x) => Err(S::Error::custom(format!("non-finite float: {x}"))),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Instant(i) => i.serialize(serializer),
            Self::InstantRef(Some(i)) => i.serialize(serializer),
            Self::ObjectId(id) => id.serialize(serializer),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Self::Record(rec) => {
                let mut out = serializer.serialize_map(Some(rec.fields.len()))?;
                for (k, v) in &rec.fields {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Self::Rendered(r) => serializer.serialize_str(&r.render()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Text,
    Instant => Instant,
    ObjectId => ObjectId,
    Vec<Value> => Seq,
    BTreeMap<String, Value> => Map,
    Record => Record,
    Rendered => Rendered,
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::I64(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::U64(v as u64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(Instant::from_utc(v))
    }
}

impl From<Option<Instant>> for Value {
    fn from(v: Option<Instant>) -> Self {
        Self::InstantRef(v.map(Box::new))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Self::U64(u)
                } else if let Some(f) = n.as_f64() {
                    Self::F64(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Seq(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind().as_str(), "null");
        assert_eq!(Value::from(7i16).kind(), ValueKind::I16);
        assert_eq!(Value::from(7u64).kind(), ValueKind::U64);
        assert_eq!(Value::from("x").kind().to_string(), "text");
        assert_eq!(Value::Seq(vec![]).kind(), ValueKind::Sequence);
        assert_eq!(Value::from(None::<Instant>).kind(), ValueKind::InstantRef);
    }

    #[test]
    fn zero_values_per_variant() {
        assert!(Value::Null.is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(Value::I32(0).is_zero());
        assert!(Value::F64(0.0).is_zero());
        assert!(Value::Text(String::new()).is_zero());
        assert!(Value::Seq(vec![]).is_zero());
        assert!(Value::Map(BTreeMap::new()).is_zero());
        assert!(Value::InstantRef(None).is_zero());
        assert!(Value::Instant(Instant::zero()).is_zero());
        assert!(Value::ObjectId(ObjectId::ZERO).is_zero());
        assert!(Value::Rendered(Rendered::new("")).is_zero());
    }

    #[test]
    fn non_zero_values_per_variant() {
        assert!(!Value::Seq(vec![Value::Null]).is_zero());
        assert!(!Value::from(Some(Instant::zero())).is_zero());
        assert!(!Value::Rendered(Rendered::new("x")).is_zero());
        assert!(!Value::F32(f32::NAN).is_zero());
    }

    #[test]
    fn record_zero_when_all_fields_zero() {
        let zero = Record::new("Point").field("x", 0i32).field("y", "");
        assert!(Value::Record(zero).is_zero());
        let set = Record::new("Point").field("x", 0i32).field("y", "a");
        assert!(!Value::Record(set).is_zero());
        assert!(Value::Record(Record::new("Unit")).is_zero());
    }

    #[test]
    fn placeholder_rendering() {
        let seq = Value::Seq(vec![Value::from(1i32), Value::from("a")]);
        assert_eq!(seq.to_string(), "[1 a]");

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::from(2i64));
        map.insert("a".to_string(), Value::Null);
        assert_eq!(Value::Map(map).to_string(), "map[a:<nil> b:2]");

        let rec = Record::new("P").field("x", 1.5f64).field("y", f64::NAN);
        assert_eq!(Value::Record(rec).to_string(), "{1.5 NaN}");
    }

    #[test]
    fn serialize_record_keeps_field_order() {
        let rec = Record::new("P").field("z", 1i32).field("a", true);
        let json = serde_json::to_string(&Value::Record(rec)).unwrap();
        assert_eq!(json, r#"{"z":1,"a":true}"#);
    }

    #[test]
    fn serialize_rejects_non_finite() {
        let v = Value::Seq(vec![Value::F64(f64::INFINITY)]);
        assert!(serde_json::to_string(&v).is_err());
        assert_eq!(v.find_non_finite(), Some(f64::INFINITY));
    }

    #[test]
    fn from_json_value() {
        let v = Value::from(serde_json::json!({"n": -3, "u": 18446744073709551615u64, "f": 0.5, "l": [null]}));
        let Value::Map(map) = v else {
            panic!("expected mapping");
        };
        assert_eq!(map["n"], Value::I64(-3));
        assert_eq!(map["u"], Value::U64(u64::MAX));
        assert_eq!(map["f"], Value::F64(0.5));
        assert_eq!(map["l"], Value::Seq(vec![Value::Null]));
    }

    #[test]
    fn from_serialize_struct() {
        #[derive(Serialize)]
        struct Claims {
            sub: String,
            exp: i64,
        }
        let v = Value::from_serialize(&Claims {
            sub: "u1".into(),
            exp: 10,
        })
        .unwrap();
        assert_eq!(v.kind(), ValueKind::Mapping);
    }

    #[test]
    fn rendered_debug_shows_text() {
        let r = Rendered::new(42);
        assert_eq!(format!("{r:?}"), "Rendered(\"42\")");
    }
}
