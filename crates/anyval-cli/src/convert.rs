//! # Conversion Subcommands
//!
//! One handler per target type. Each reads a single input, optionally
//! parsed as JSON, and prints the coerced result on stdout.
//!
//! By default the total functions are used, so malformed input prints the
//! target's zero value. With `--strict` the fallible twins are used instead
//! and the first failure becomes the process error.

use anyhow::{Context, Result};
use clap::Args;

use anyval_core::{
    to_boolean, to_float, to_instant_with, to_integer, to_text, try_to_boolean, try_to_float,
    try_to_instant_with, try_to_integer, CanonicalBytes, Instant, RoundingMode, TimeUnit, Value,
};

use crate::config::CliConfig;

/// Options shared by every conversion.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub strict: bool,
    pub config: CliConfig,
}

/// The value to convert.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Raw input. Taken as text unless `--json` is given.
    #[arg(value_name = "INPUT", allow_hyphen_values = true)]
    pub input: String,

    /// Parse the input as a JSON document first.
    #[arg(long)]
    pub json: bool,
}

impl InputArgs {
    pub fn value(&self) -> Result<Value> {
        if !self.json {
            return Ok(Value::Text(self.input.clone()));
        }
        let json: serde_json::Value = serde_json::from_str(&self.input)
            .with_context(|| format!("input is not valid JSON: {}", self.input))?;
        Ok(Value::from(json))
    }
}

/// Arguments for `anyval float`.
#[derive(Args, Debug, Clone)]
pub struct FloatArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Rounding mode: none, up, down or auto.
    #[arg(long = "round", value_name = "MODE")]
    pub mode: Option<RoundingMode>,

    /// Decimal places kept by the rounding mode.
    #[arg(long, allow_negative_numbers = true)]
    pub places: Option<i32>,
}

/// Arguments for `anyval time`.
#[derive(Args, Debug, Clone)]
pub struct TimeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Candidate format, tried in the order given. Repeatable. Accepts
    /// strftime layouts and unix, unix-milli, unix-micro, unix-nano.
    #[arg(long = "format", value_name = "FORMAT")]
    pub formats: Vec<String>,

    /// Print an epoch count in this unit (s, ms, us, ns) instead of RFC 3339.
    #[arg(long, value_name = "UNIT")]
    pub epoch: Option<TimeUnit>,
}

pub fn render_text(args: &InputArgs, opts: &RunOptions) -> Result<String> {
    let value = args.value()?;
    if opts.strict && value.is_structured() {
        let canonical = CanonicalBytes::from_value(&value)?;
        return Ok(canonical.into_string());
    }
    Ok(to_text(&value))
}

pub fn render_int(args: &InputArgs, opts: &RunOptions) -> Result<String> {
    let value = args.value()?;
    let n = if opts.strict {
        try_to_integer(&value)?
    } else {
        to_integer(&value)
    };
    Ok(n.to_string())
}

pub fn render_float(args: &FloatArgs, opts: &RunOptions) -> Result<String> {
    let value = args.input.value()?;
    let f = if opts.strict {
        try_to_float(&value)?
    } else {
        to_float(&value)
    };
    let policy = opts.config.rounding_with(args.mode, args.places);
    Ok(to_text(&Value::F64(policy.apply(f))))
}

pub fn render_bool(args: &InputArgs, opts: &RunOptions) -> Result<String> {
    let value = args.value()?;
    let b = if opts.strict {
        try_to_boolean(&value)?
    } else {
        to_boolean(&value)
    };
    Ok(b.to_string())
}

pub fn render_time(args: &TimeArgs, opts: &RunOptions) -> Result<String> {
    let value = args.input.value()?;
    let formats = opts.config.formats_with(&args.formats);
    let instant = if opts.strict {
        try_to_instant_with(&value, formats)?
    } else {
        to_instant_with(&value, formats)
    };
    match args.epoch {
        Some(unit) => epoch_count(&instant, unit).map(|n| n.to_string()),
        None => Ok(instant.to_rfc3339()),
    }
}

fn epoch_count(instant: &Instant, unit: TimeUnit) -> Result<i64> {
    instant
        .to_unix(unit)
        .with_context(|| format!("{instant} does not fit in a 64-bit {unit} count"))
}

pub fn render_kind(args: &InputArgs) -> Result<String> {
    Ok(args.value()?.kind().to_string())
}

fn emit(rendered: Result<String>) -> Result<u8> {
    println!("{}", rendered?);
    Ok(0)
}

/// Execute `anyval text`.
pub fn run_text(args: &InputArgs, opts: &RunOptions) -> Result<u8> {
    emit(render_text(args, opts))
}

/// Execute `anyval int`.
pub fn run_int(args: &InputArgs, opts: &RunOptions) -> Result<u8> {
    emit(render_int(args, opts))
}

/// Execute `anyval float`.
pub fn run_float(args: &FloatArgs, opts: &RunOptions) -> Result<u8> {
    emit(render_float(args, opts))
}

/// Execute `anyval bool`.
pub fn run_bool(args: &InputArgs, opts: &RunOptions) -> Result<u8> {
    emit(render_bool(args, opts))
}

/// Execute `anyval time`.
pub fn run_time(args: &TimeArgs, opts: &RunOptions) -> Result<u8> {
    emit(render_time(args, opts))
}

/// Execute `anyval kind`.
pub fn run_kind(args: &InputArgs) -> Result<u8> {
    emit(render_kind(args))
}
