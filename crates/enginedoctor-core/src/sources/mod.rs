//! Audio source implementations.
//!
//! - [`wav::WavFileSource`]: native WAV decoding, no external tools.
//! - [`ffmpeg::FfmpegFileSource`]: anything ffmpeg can decode.
//! - [`ffmpeg::MicrophoneSource`]: live capture through ffmpeg.

pub mod ffmpeg;
pub mod helpers;
pub mod wav;

use std::path::Path;

use crate::source::{AudioSource, RawAudio, SourceInfo};

pub use ffmpeg::{FfmpegFileSource, MicrophoneSource};
pub use wav::{WavError, WavFileSource};

/// A source kind and whether it can run on this machine.
#[derive(Debug, Clone)]
pub struct SourceStatus {
    pub info: SourceInfo,
    pub available: bool,
}

/// Every source kind, with availability on this machine.
pub fn source_catalog() -> Vec<SourceStatus> {
    let sources: Vec<Box<dyn AudioSource>> = vec![
        Box::new(WavFileSource::new("")),
        Box::new(FfmpegFileSource::new("")),
        Box::new(MicrophoneSource::default()),
    ];
    sources
        .iter()
        .map(|s| SourceStatus {
            info: s.info().clone(),
            available: s.is_available(),
        })
        .collect()
}

/// Pick a file source for `path`: the native reader for `.wav`, ffmpeg for
/// everything else.
pub fn source_for_path(path: &Path) -> Box<dyn AudioSource> {
    if is_wav(path) {
        Box::new(WavFileSource::new(path))
    } else {
        Box::new(FfmpegFileSource::new(path))
    }
}

/// Decode a recording from disk.
///
/// WAV files the native reader cannot handle (compressed codecs, odd bit
/// depths) are retried through ffmpeg when it is installed.
pub fn open_recording(path: &Path) -> std::io::Result<RawAudio> {
    if is_wav(path) {
        match wav::read_wav(path) {
            Ok(raw) => return Ok(raw),
            Err(WavError::Unsupported { format, bits }) => {
                let fallback = FfmpegFileSource::new(path);
                if !fallback.is_available() {
                    return Err(WavError::Unsupported { format, bits }.into());
                }
                log::warn!(
                    "{}: WAV format 0x{format:04x}/{bits}-bit not handled natively, decoding with ffmpeg",
                    path.display()
                );
                return fallback.capture();
            }
            Err(e) => return Err(e.into()),
        }
    }

    let source = FfmpegFileSource::new(path);
    if !source.is_available() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!(
                "{}: only .wav is decoded natively; install ffmpeg for other formats",
                path.display()
            ),
        ));
    }
    source.capture()
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav") || e.eq_ignore_ascii_case("wave"))
}
