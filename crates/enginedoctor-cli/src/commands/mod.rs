pub mod diagnose;
pub mod record;
pub mod render;
pub mod server;
pub mod sources;
pub mod synth;

use std::path::Path;

use clap::Args;
use enginedoctor_core::DiagnosticParams;

/// Pipeline overrides shared by every command that scores audio.
///
/// Precedence: built-in defaults, then `--params` file, then flags.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// JSON file with diagnostic parameters (any subset of fields)
    #[arg(long)]
    pub params: Option<String>,

    /// Number of equal chunks the recording is cut into
    #[arg(long)]
    pub chunks: Option<usize>,

    /// Chunks shorter than this many samples are not scored
    #[arg(long)]
    pub min_chunk_len: Option<usize>,

    /// Floor added to the envelope before the logarithm
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Turbulence above this is WARNING
    #[arg(long)]
    pub warning: Option<f64>,

    /// Turbulence above this is CRITICAL
    #[arg(long)]
    pub critical: Option<f64>,

    /// Score chunks on one thread
    #[arg(long)]
    pub sequential: bool,
}

/// Resolve [`ParamArgs`] into validated parameters.
pub fn build_params(args: &ParamArgs) -> std::io::Result<DiagnosticParams> {
    let mut params = match &args.params {
        Some(path) => DiagnosticParams::load_from_path(Path::new(path))?,
        None => DiagnosticParams::default(),
    };
    if let Some(n) = args.chunks {
        params.chunk_count = n;
    }
    if let Some(n) = args.min_chunk_len {
        params.min_chunk_len = n;
    }
    if let Some(eps) = args.epsilon {
        params.log_floor = eps;
    }
    if let Some(w) = args.warning {
        params.thresholds.warning = w;
    }
    if let Some(c) = args.critical {
        params.thresholds.critical = c;
    }
    if args.sequential {
        params.parallel = false;
    }
    params.validate()?;
    Ok(params)
}

/// [`build_params`], exiting with a message on failure.
pub fn params_or_exit(args: &ParamArgs) -> DiagnosticParams {
    build_params(args).unwrap_or_else(|e| {
        eprintln!("Invalid parameters: {e}");
        std::process::exit(1);
    })
}

/// Write `value` as pretty JSON to `path`.
pub fn write_json<T: serde::Serialize>(path: &str, value: &T) {
    let text = match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("\nFailed to serialize results: {e}");
            return;
        }
    };
    match std::fs::write(path, text) {
        Ok(()) => println!("\nResults written to {path}"),
        Err(e) => eprintln!("\nFailed to write {path}: {e}"),
    }
}

/// Parse a duration like `"5"`, `"2.5s"`, `"500ms"` or `"1m"` into seconds.
pub fn parse_duration_secs(s: &str) -> Option<f64> {
    let s = s.trim();
    let (numeric, scale) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 0.001)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1.0)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60.0)
    } else {
        (s, 1.0)
    };
    let value: f64 = numeric.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value * scale)
}
