//! # anyval-core — Untyped Value Normalization
//!
//! Total coercions from a dynamically-typed [`Value`] into text, integers,
//! floats, booleans, object identifiers and instants. "Total" means every
//! function returns a value of its target type for every input: malformed
//! input yields the target's zero value (`""`, `0`, `0.0`, `false`,
//! [`ObjectId::ZERO`], [`Instant::zero`]) rather than an error or a panic.
//!
//! ## Key Design Principles
//!
//! 1. **Closed input union.** [`Value`] enumerates every accepted shape and
//!    each coercion matches it exhaustively. There is no reflection and no
//!    catch-all arm that could silently absorb a new variant.
//!
//! 2. **Total and fallible twins.** Every total function (`to_integer`) has
//!    a `try_*` twin (`try_to_integer`) that reports why a value fell back.
//!    The total function is defined as the twin plus a zero default, so the
//!    two cannot drift apart.
//!
//! 3. **Ordered format table.** Time text is matched against a fixed,
//!    ordered table ([`FormatRegistry`]); the first match wins. Ambiguous
//!    shapes such as `01/02/2006` resolve by table position alone.
//!
//! 4. **Magnitude-based epoch units.** Bare integer text is read as seconds,
//!    milliseconds, microseconds or nanoseconds by comparing against
//!    `10^12`, `10^15` and `10^18` (exclusive).
//!
//! 5. **Deterministic structured text.** Sequences, mappings and records
//!    render as RFC 8785 canonical JSON via [`CanonicalBytes`].
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No shared mutable state; the format table is built once and read-only.

pub mod canonical;
pub mod coerce;
pub mod error;
pub mod formats;
pub mod identity;
pub mod rounding;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::{convert, to_json, CanonicalBytes};
pub use coerce::{
    to_boolean, to_float, to_integer, to_object_id, to_text, try_to_boolean, try_to_float,
    try_to_integer, try_to_object_id,
};
pub use error::{AnyvalError, CanonicalizationError, CoercionError, CoercionResult};
pub use formats::{FormatRegistry, TimeFormat};
pub use identity::ObjectId;
pub use rounding::{round, to_float_rounded, RoundingMode, RoundingPolicy};
pub use temporal::{
    to_instant, to_instant_with, try_to_instant, try_to_instant_with, Instant, TimeUnit,
};
pub use value::{Record, Rendered, Value, ValueKind};
