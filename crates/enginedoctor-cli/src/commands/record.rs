use std::path::Path;

use enginedoctor_core::sources::MicrophoneSource;
use enginedoctor_core::sources::wav::write_pcm16_wav;
use enginedoctor_core::{AudioSource, DiagnosticParams, RawAudio};

use super::render::DiagnoseView;

pub struct RecordCommandConfig<'a> {
    pub duration: &'a str,
    pub sample_rate: u32,
    pub save_path: Option<&'a str>,
    pub params: DiagnosticParams,
    pub view: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: RecordCommandConfig<'_>) {
    let Some(seconds) = super::parse_duration_secs(cfg.duration) else {
        eprintln!("Invalid duration: {}", cfg.duration);
        std::process::exit(1);
    };

    let mic = MicrophoneSource::new(seconds, cfg.sample_rate);
    if !mic.is_available() {
        eprintln!("Microphone capture needs ffmpeg (and macOS or Linux).");
        eprintln!("Run `enginedoctor sources` to see what is available.");
        std::process::exit(1);
    }

    println!(
        "Recording {seconds:.1} s at {} Hz. Hold the microphone near the engine...",
        cfg.sample_rate
    );
    let raw = match mic.capture() {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Recording failed: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = cfg.save_path {
        match save_raw(Path::new(path), &raw) {
            Ok(()) => println!("Saved recording to {path}"),
            Err(e) => eprintln!("Failed to save {path}: {e}"),
        }
    }

    super::diagnose::report_recording(
        raw,
        Some("microphone".to_string()),
        &cfg.params,
        DiagnoseView::parse(cfg.view),
        cfg.output_path,
        false,
    );
}

fn save_raw(path: &Path, raw: &RawAudio) -> std::io::Result<()> {
    let channels = u16::try_from(raw.channels).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} channels do not fit a WAV header", raw.channels),
        )
    })?;
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_pcm16_wav(&mut writer, &raw.samples, channels, raw.sample_rate)
}
