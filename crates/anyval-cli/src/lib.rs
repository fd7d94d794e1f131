//! # anyval-cli — Command-Line Front End for Value Normalization
//!
//! Provides the `anyval` binary, a thin shell over `anyval-core` for
//! inspecting how an input would be coerced.
//!
//! ## Subcommands
//!
//! - `anyval text`: Render as text (canonical JSON for structured input).
//! - `anyval int`: Coerce to a 64-bit integer.
//! - `anyval float`: Coerce to a float, optionally rounded.
//! - `anyval bool`: Coerce to a boolean.
//! - `anyval time`: Normalize to a UTC instant.
//! - `anyval kind`: Report the dynamic kind of the input.
//!
//! ```bash
//! anyval time 1697297045123
//! anyval time 14/10/2024 --format %d/%m/%Y --epoch ms
//! anyval float 2.341 --round up --places 2
//! anyval --strict int 3.5
//! anyval text --json '{"b": 1, "a": 2}'
//! ```

pub mod config;
pub mod convert;
