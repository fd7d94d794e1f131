//! # Error Types
//!
//! The total coercion functions never return these. They exist for the
//! parallel `try_*` API, which reports why a value could not be coerced,
//! and for canonical serialization.

use thiserror::Error;

use crate::value::ValueKind;

/// Top-level error type for the anyval engine.
#[derive(Error, Debug)]
pub enum AnyvalError {
    /// A value could not be coerced to the requested type.
    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a coercion fell back to the target type's zero value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The input kind has no conversion to the target type.
    #[error("cannot coerce {kind} to {target}")]
    UnsupportedKind {
        /// Name of the requested target type.
        target: &'static str,
        /// Dynamic kind of the input.
        kind: ValueKind,
    },

    /// Text is not a strict base-10 integer.
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    /// Text is not a floating point number.
    #[error("invalid float: {0:?}")]
    InvalidFloat(String),

    /// Text is neither a boolean token nor a number.
    #[error("unrecognized boolean: {0:?}")]
    UnrecognizedBoolean(String),

    /// Text is not a 24-character hex object identifier.
    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    /// No candidate layout matched the text.
    #[error("no time format matched {input:?} (tried {tried} formats)")]
    NoMatchingFormat {
        /// The trimmed input text.
        input: String,
        /// How many candidate formats were attempted.
        tried: usize,
    },

    /// The value parsed but lies outside the representable instant range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and infinities have no JSON representation.
    #[error("non-finite float has no canonical representation: {0}")]
    NonFiniteFloat(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Convenience alias for fallible coercions.
pub type CoercionResult<T> = Result<T, CoercionError>;
