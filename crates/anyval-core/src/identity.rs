//! # Object Identifiers
//!
//! A 12-byte, self-describing document identifier whose canonical text form
//! is 24 lowercase hex characters. Coercion to text checks for this type
//! before any generic structure handling, so an identifier always renders
//! as its hex form rather than as a byte array.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoercionError;

/// Length of an object identifier in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// A 12-byte document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// The all-zero identifier, used as the coercion fallback.
    pub const ZERO: Self = Self([0; OBJECT_ID_LEN]);

    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a 24-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, CoercionError> {
        let invalid = || CoercionError::InvalidObjectId(s.to_string());
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(invalid());
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (slot, pair) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            let hi = hex_nibble(pair[0]).ok_or_else(invalid)?;
            let lo = hex_nibble(pair[1]).ok_or_else(invalid)?;
            *slot = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// True for [`ObjectId::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0; OBJECT_ID_LEN]
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "65a1b2c3d4e5f60718293a4b";

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_hex(HEX).unwrap();
        assert_eq!(id.to_hex(), HEX);
        assert_eq!(id.to_string(), HEX);
    }

    #[test]
    fn uppercase_hex_accepted_and_lowercased() {
        let id: ObjectId = HEX.to_uppercase().parse().unwrap();
        assert_eq!(id.to_hex(), HEX);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(ObjectId::from_hex("65a1b2").is_err());
        assert!(ObjectId::from_hex("").is_err());
        assert!(ObjectId::from_hex(&format!("{HEX}00")).is_err());
    }

    #[test]
    fn non_hex_rejected() {
        let err = ObjectId::from_hex("zza1b2c3d4e5f60718293a4b").unwrap_err();
        assert!(matches!(err, CoercionError::InvalidObjectId(_)));
    }

    #[test]
    fn multibyte_input_rejected_without_panic() {
        // 24 bytes, but not ASCII.
        assert!(ObjectId::from_hex(&"é".repeat(12)).is_err());
    }

    #[test]
    fn zero_detection() {
        assert!(ObjectId::ZERO.is_zero());
        assert!(ObjectId::default().is_zero());
        assert!(!ObjectId::from_hex(HEX).unwrap().is_zero());
    }

    #[test]
    fn serde_as_hex_string() {
        let id = ObjectId::from_hex(HEX).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{HEX}\""));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
