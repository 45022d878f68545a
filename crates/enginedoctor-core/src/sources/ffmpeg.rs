//! ffmpeg-backed sources: decode any audio file, or record from the
//! microphone.
//!
//! Both ask ffmpeg for interleaved 32-bit float PCM on stdout
//! (`-f f32le pipe:1`) and reinterpret the bytes.

use std::path::{Path, PathBuf};

use crate::source::{AudioSource, RawAudio, SourceInfo, SourceKind};

use super::helpers::{command_exists, f32le_to_samples, run_capture};

/// Default recording length, in seconds.
pub const DEFAULT_CAPTURE_SECS: f64 = 5.0;

/// Default recording sample rate.
pub const DEFAULT_CAPTURE_RATE: u32 = 44100;

static FFMPEG_FILE_INFO: SourceInfo = SourceInfo {
    name: "ffmpeg_file",
    description: "Any audio file ffmpeg can decode (mp3, m4a, ogg, flac, webm, ...)",
    kind: SourceKind::File,
    requires: &["ffmpeg", "ffprobe"],
};

static MICROPHONE_INFO: SourceInfo = SourceInfo {
    name: "microphone",
    description: "Default input device via ffmpeg (avfoundation on macOS, pulse on Linux)",
    kind: SourceKind::Capture,
    requires: &["ffmpeg"],
};

/// Decodes an arbitrary audio file through ffmpeg, keeping its native
/// channel layout and sample rate.
pub struct FfmpegFileSource {
    path: PathBuf,
}

impl FfmpegFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AudioSource for FfmpegFileSource {
    fn info(&self) -> &SourceInfo {
        &FFMPEG_FILE_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg") && command_exists("ffprobe")
    }

    fn capture(&self) -> std::io::Result<RawAudio> {
        let path = path_arg(&self.path)?;
        let probe = run_capture(
            "ffprobe",
            &[
                "-v",
                "error",
                "-select_streams",
                "a:0",
                "-show_entries",
                "stream=sample_rate,channels",
                "-of",
                "default=noprint_wrappers=1",
                path,
            ],
        )?;
        let (channels, sample_rate) = parse_probe(&String::from_utf8_lossy(&probe))?;

        let raw = run_capture(
            "ffmpeg",
            &[
                "-v", "error", "-nostdin", "-i", path, "-map", "0:a:0", "-f", "f32le", "-acodec",
                "pcm_f32le", "pipe:1",
            ],
        )?;

        Ok(RawAudio {
            samples: f32le_to_samples(&raw),
            channels,
            sample_rate,
        })
    }
}

/// Records a mono clip from the default input device.
pub struct MicrophoneSource {
    duration_secs: f64,
    sample_rate: u32,
}

impl MicrophoneSource {
    pub fn new(duration_secs: f64, sample_rate: u32) -> Self {
        Self {
            duration_secs,
            sample_rate,
        }
    }
}

impl Default for MicrophoneSource {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_SECS, DEFAULT_CAPTURE_RATE)
    }
}

impl AudioSource for MicrophoneSource {
    fn info(&self) -> &SourceInfo {
        &MICROPHONE_INFO
    }

    fn is_available(&self) -> bool {
        input_device().is_some() && command_exists("ffmpeg")
    }

    fn capture(&self) -> std::io::Result<RawAudio> {
        let Some((format, device)) = input_device() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "microphone capture is only wired up for macOS and Linux",
            ));
        };
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("capture duration must be positive, got {}", self.duration_secs),
            ));
        }

        let duration = format!("{}", self.duration_secs);
        let rate = self.sample_rate.to_string();
        // ffmpeg -f avfoundation -i ":0" -t 5 -f f32le -ar 44100 -ac 1 pipe:1
        let raw = run_capture(
            "ffmpeg",
            &[
                "-v", "error", "-nostdin", "-f", format, "-i", device, "-t", &duration, "-f",
                "f32le", "-acodec", "pcm_f32le", "-ar", &rate, "-ac", "1", "pipe:1",
            ],
        )?;

        let samples = f32le_to_samples(&raw);
        if samples.is_empty() {
            log::warn!("microphone: ffmpeg returned no audio");
        }
        Ok(RawAudio {
            samples,
            channels: 1,
            sample_rate: self.sample_rate,
        })
    }
}

/// ffmpeg input format and device name for the default microphone.
fn input_device() -> Option<(&'static str, &'static str)> {
    if cfg!(target_os = "macos") {
        Some(("avfoundation", ":0"))
    } else if cfg!(target_os = "linux") {
        Some(("pulse", "default"))
    } else {
        None
    }
}

fn path_arg(path: &Path) -> std::io::Result<&str> {
    path.to_str().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path is not valid UTF-8: {}", path.display()),
        )
    })
}

/// Parse `key=value` lines from ffprobe into `(channels, sample_rate)`.
fn parse_probe(out: &str) -> std::io::Result<(usize, u32)> {
    let mut channels = None;
    let mut sample_rate = None;
    for line in out.lines() {
        match line.trim().split_once('=') {
            Some(("channels", v)) => channels = v.trim().parse::<usize>().ok(),
            Some(("sample_rate", v)) => sample_rate = v.trim().parse::<u32>().ok(),
            _ => {}
        }
    }
    match (channels, sample_rate) {
        (Some(c), Some(r)) if c > 0 => Ok((c, r)),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("no audio stream found (ffprobe said: {:?})", out.trim()),
        )),
    }
}
