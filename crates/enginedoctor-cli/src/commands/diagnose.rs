use std::path::Path;

use enginedoctor_core::presentation::DEFAULT_DECIMATION;
use enginedoctor_core::{DiagnosticParams, DiagnosticReport, RawAudio, compute_breakdown};

use super::render::{DiagnoseView, print_report};

pub struct DiagnoseCommandConfig<'a> {
    pub path: &'a str,
    pub params: DiagnosticParams,
    pub view: &'a str,
    pub output_path: Option<&'a str>,
    pub include_preview: bool,
}

pub fn run(cfg: DiagnoseCommandConfig<'_>) {
    let path = Path::new(cfg.path);
    let raw = match enginedoctor_core::open_recording(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", cfg.path);
            std::process::exit(1);
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| cfg.path.to_string());

    report_recording(
        raw,
        Some(name),
        &cfg.params,
        DiagnoseView::parse(cfg.view),
        cfg.output_path,
        cfg.include_preview,
    );
}

/// Score decoded audio, print the result and optionally save the JSON report.
pub fn report_recording(
    raw: RawAudio,
    name: Option<String>,
    params: &DiagnosticParams,
    view: DiagnoseView,
    output_path: Option<&str>,
    include_preview: bool,
) -> DiagnosticReport {
    let channels = raw.channels.max(1);
    let waveform = raw.into_waveform();
    log::info!(
        "diagnosing {} samples @ {} Hz ({channels} ch folded)",
        waveform.len(),
        waveform.sample_rate
    );

    let breakdown = compute_breakdown(&waveform, params);
    let mut report = DiagnosticReport::new(name, channels, &waveform, params, breakdown);
    if include_preview {
        report = report.with_preview(&waveform, DEFAULT_DECIMATION);
    }

    print_report(&report, &waveform, view);

    if let Some(path) = output_path {
        super::write_json(path, &report);
    }
    report
}
