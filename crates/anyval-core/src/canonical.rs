//! # Canonical Serialization
//!
//! Structured values coerced to text must render the same way every time,
//! whatever order their keys were inserted in. `CanonicalBytes` is the one
//! path that produces that text: values go through `serde_json` and are then
//! written with `serde_jcs` (RFC 8785: sorted keys, compact separators,
//! ECMAScript number formatting).
//!
//! Record fields serialize in declaration order; canonicalization sorts
//! them like any other object keys.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AnyvalError, CanonicalizationError};
use crate::value::Value;

/// UTF-8 bytes of an RFC 8785 canonical JSON document.
///
/// The inner buffer is private; construct through [`CanonicalBytes::new`]
/// or [`CanonicalBytes::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `SerializationFailed` if the value cannot be represented as
    /// JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Canonicalize a [`Value`], naming the offending float when one is not
    /// finite.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        if let Some(f) = value.find_non_finite() {
            return Err(CanonicalizationError::NonFiniteFloat(f));
        }
        Self::new(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical text. Always valid UTF-8: it was produced from a `String`.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.0).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Canonical JSON text of `obj`, or an empty string if it cannot be
/// serialized.
pub fn to_json(obj: &impl Serialize) -> String {
    match CanonicalBytes::new(obj) {
        Ok(bytes) => bytes.into_string(),
        Err(err) => {
            tracing::trace!(error = %err, "JSON rendering failed");
            String::new()
        }
    }
}

/// Convert between any two serde shapes through JSON, e.g. a mapping into a
/// struct or a struct into a mapping.
pub fn convert<T: DeserializeOwned>(obj: &impl Serialize) -> Result<T, AnyvalError> {
    let value = serde_json::to_value(obj)?;
    Ok(serde_json::from_value(value)?)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(serde_json::Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..8)
                    .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_bytes_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_bytes_reparse_to_same_value(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: serde_json::Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        #[test]
        fn engine_value_canonicalizes_like_json(value in json_value()) {
            let direct = CanonicalBytes::new(&value).unwrap();
            let via_value = CanonicalBytes::from_value(&Value::from(value)).unwrap();
            prop_assert_eq!(direct, via_value);
        }
    }
}
