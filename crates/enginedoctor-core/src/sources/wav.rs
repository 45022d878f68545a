//! Native RIFF/WAVE reader and a 16-bit PCM writer.
//!
//! Handles integer PCM (8/16/24/32-bit), IEEE float (32/64-bit) and the
//! `WAVE_FORMAT_EXTENSIBLE` wrapper around either. Integer samples are scaled
//! to `[-1, 1)`. Chunks other than `fmt ` and `data` are skipped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::source::{AudioSource, RawAudio, SourceInfo, SourceKind};
use crate::waveform::Waveform;

const FORMAT_PCM: u16 = 0x0001;
const FORMAT_IEEE_FLOAT: u16 = 0x0003;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

static WAV_FILE_INFO: SourceInfo = SourceInfo {
    name: "wav_file",
    description: "RIFF/WAVE file, PCM 8/16/24/32-bit or IEEE float, decoded natively",
    kind: SourceKind::File,
    requires: &[],
};

/// Errors from parsing a WAV file.
#[derive(Debug)]
pub enum WavError {
    Io(std::io::Error),
    NotRiff,
    NotWave,
    MissingFormat,
    MissingData,
    Truncated(&'static str),
    Unsupported { format: u16, bits: u16 },
    BadHeader(String),
}

impl std::fmt::Display for WavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::NotRiff => write!(f, "not a RIFF file"),
            Self::NotWave => write!(f, "RIFF file is not WAVE"),
            Self::MissingFormat => write!(f, "no fmt chunk before data"),
            Self::MissingData => write!(f, "no data chunk"),
            Self::Truncated(what) => write!(f, "file truncated in {what}"),
            Self::Unsupported { format, bits } => {
                write!(f, "unsupported sample format 0x{format:04x} at {bits} bits")
            }
            Self::BadHeader(msg) => write!(f, "bad fmt chunk: {msg}"),
        }
    }
}

impl std::error::Error for WavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WavError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<WavError> for std::io::Error {
    fn from(e: WavError) -> Self {
        match e {
            WavError::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Parsed `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatChunk {
    format: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits: u16,
}

/// Reads a WAV file from disk without any external tools.
pub struct WavFileSource {
    path: PathBuf,
}

impl WavFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSource for WavFileSource {
    fn info(&self) -> &SourceInfo {
        &WAV_FILE_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn capture(&self) -> std::io::Result<RawAudio> {
        Ok(read_wav(&self.path)?)
    }
}

/// Read and decode a WAV file.
pub fn read_wav(path: &Path) -> Result<RawAudio, WavError> {
    let bytes = std::fs::read(path)?;
    parse_wav(&bytes)
}

/// Decode an in-memory WAV file.
pub fn parse_wav(bytes: &[u8]) -> Result<RawAudio, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" {
        return Err(WavError::NotRiff);
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWave);
    }

    let mut format: Option<FormatChunk> = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let declared = u32_le(&bytes[pos + 4..pos + 8]) as usize;
        let body_start = pos + 8;
        // Streaming writers leave the size at 0xFFFFFFFF; trust the file.
        let body_end = body_start.saturating_add(declared).min(bytes.len());
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => format = Some(parse_format(body)?),
            b"data" => {
                let fmt = format.ok_or(WavError::MissingFormat)?;
                return decode_samples(body, fmt);
            }
            _ => {}
        }

        // Chunks are word-aligned.
        pos = body_start.saturating_add(declared).saturating_add(declared & 1);
    }

    if format.is_none() {
        Err(WavError::MissingFormat)
    } else {
        Err(WavError::MissingData)
    }
}

fn parse_format(body: &[u8]) -> Result<FormatChunk, WavError> {
    if body.len() < 16 {
        return Err(WavError::Truncated("fmt chunk"));
    }
    let mut fmt = FormatChunk {
        format: u16_le(&body[0..2]),
        channels: u16_le(&body[2..4]),
        sample_rate: u32_le(&body[4..8]),
        block_align: u16_le(&body[12..14]),
        bits: u16_le(&body[14..16]),
    };
    if fmt.format == FORMAT_EXTENSIBLE {
        // cbSize(2) validBits(2) channelMask(4) then the sub-format GUID,
        // whose first two bytes carry the real format code.
        if body.len() < 26 {
            return Err(WavError::Truncated("extensible fmt chunk"));
        }
        fmt.format = u16_le(&body[24..26]);
    }
    if fmt.channels == 0 {
        return Err(WavError::BadHeader("zero channels".to_string()));
    }
    let bytes_per_sample = usize::from(fmt.bits.div_ceil(8));
    if usize::from(fmt.block_align) != bytes_per_sample * usize::from(fmt.channels) {
        return Err(WavError::BadHeader(format!(
            "block_align {} does not match {} channels of {} bits",
            fmt.block_align, fmt.channels, fmt.bits
        )));
    }
    Ok(fmt)
}

fn decode_samples(body: &[u8], fmt: FormatChunk) -> Result<RawAudio, WavError> {
    let decode: fn(&[u8]) -> f64 = match (fmt.format, fmt.bits) {
        (FORMAT_PCM, 8) => |b: &[u8]| (f64::from(b[0]) - 128.0) / 128.0,
        (FORMAT_PCM, 16) => |b: &[u8]| f64::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0,
        (FORMAT_PCM, 24) => {
            |b: &[u8]| f64::from(i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8) / 8_388_608.0
        }
        (FORMAT_PCM, 32) => {
            |b: &[u8]| f64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])) / 2_147_483_648.0
        }
        (FORMAT_IEEE_FLOAT, 32) => |b: &[u8]| f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        (FORMAT_IEEE_FLOAT, 64) => {
            |b: &[u8]| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }
        (format, bits) => return Err(WavError::Unsupported { format, bits }),
    };

    let width = usize::from(fmt.bits / 8);
    let frame = width * usize::from(fmt.channels);
    let usable = body.len() - body.len() % frame;
    let samples = body[..usable].chunks_exact(width).map(decode).collect();

    Ok(RawAudio {
        samples,
        channels: usize::from(fmt.channels),
        sample_rate: fmt.sample_rate,
    })
}

/// Encode interleaved samples as a 16-bit PCM WAV stream.
///
/// Samples are clamped to `[-1, 1]`.
pub fn write_pcm16_wav<W: Write>(
    writer: &mut W,
    samples: &[f64],
    channels: u16,
    sample_rate: u32,
) -> std::io::Result<()> {
    let too_large = |what: &str| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{what} too large for a RIFF header"),
        )
    };
    let channels = channels.max(1);
    let block_align = channels
        .checked_mul(2)
        .ok_or_else(|| too_large("channel count"))?;
    let byte_rate = sample_rate
        .checked_mul(u32::from(block_align))
        .ok_or_else(|| too_large("byte rate"))?;
    let data_len = samples
        .len()
        .checked_mul(2)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| too_large("waveform"))?;
    let riff_len = data_len
        .checked_add(36)
        .ok_or_else(|| too_large("waveform"))?;

    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_len.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&FORMAT_PCM.to_le_bytes())?;
    writer.write_all(&channels.to_le_bytes())?;
    writer.write_all(&sample_rate.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&block_align.to_le_bytes())?;
    writer.write_all(&16u16.to_le_bytes())?;

    writer.write_all(b"data")?;
    writer.write_all(&data_len.to_le_bytes())?;
    for &s in samples {
        let q = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        writer.write_all(&q.to_le_bytes())?;
    }
    writer.flush()
}

/// Save a mono waveform as a 16-bit PCM WAV file.
pub fn save_waveform(path: &Path, waveform: &Waveform) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pcm16_wav(&mut writer, &waveform.samples, 1, waveform.sample_rate)
}

fn u16_le(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a WAV header + data by hand for formats the writer doesn't emit.
    fn wav_bytes(format: u16, channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits.div_ceil(8);
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&format.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        out.extend_from_slice(&(rate * u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn pcm16_write_then_read() {
        let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
        let mut buf = Vec::new();
        write_pcm16_wav(&mut buf, &samples, 2, 22050).unwrap();
        let raw = parse_wav(&buf).unwrap();
        assert_eq!(raw.channels, 2);
        assert_eq!(raw.sample_rate, 22050);
        assert_eq!(raw.samples.len(), 6);
        for (a, b) in raw.samples.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn pcm8_is_offset_binary() {
        let raw = parse_wav(&wav_bytes(FORMAT_PCM, 1, 8000, 8, &[128, 0, 255])).unwrap();
        assert_eq!(raw.samples[0], 0.0);
        assert_eq!(raw.samples[1], -1.0);
        assert!((raw.samples[2] - 127.0 / 128.0).abs() < 1e-12);
    }

    #[test]
    fn pcm24_sign_extends() {
        // 0x800000 = most negative, 0x7FFFFF = most positive.
        let data = [0x00, 0x00, 0x80, 0xFF, 0xFF, 0x7F];
        let raw = parse_wav(&wav_bytes(FORMAT_PCM, 1, 48000, 24, &data)).unwrap();
        assert_eq!(raw.samples[0], -1.0);
        assert!((raw.samples[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn float32_passes_through() {
        let mut data = Vec::new();
        for v in [0.125f32, -0.75] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let raw = parse_wav(&wav_bytes(FORMAT_IEEE_FLOAT, 1, 44100, 32, &data)).unwrap();
        assert_eq!(raw.samples, vec![0.125, -0.75]);
    }

    #[test]
    fn extensible_format_resolves_subformat() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_EXTENSIBLE.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&16000u32.to_le_bytes());
        bytes.extend_from_slice(&32000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(&22u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 14]);
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&16384i16.to_le_bytes());
        bytes.extend_from_slice(&(-16384i16).to_le_bytes());

        let raw = parse_wav(&bytes).unwrap();
        assert_eq!(raw.sample_rate, 16000);
        assert_eq!(raw.samples, vec![0.5, -0.5]);
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let mut bytes = wav_bytes(FORMAT_PCM, 1, 8000, 16, &[0, 64]);
        // Splice an odd-sized LIST chunk (plus pad byte) in front of fmt.
        let mut list = Vec::new();
        list.extend_from_slice(b"LIST");
        list.extend_from_slice(&3u32.to_le_bytes());
        list.extend_from_slice(b"abc");
        list.push(0);
        bytes.splice(12..12, list);
        let raw = parse_wav(&bytes).unwrap();
        assert_eq!(raw.samples, vec![0.5]);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let raw = parse_wav(&wav_bytes(FORMAT_PCM, 2, 8000, 16, &[0, 0, 0, 0, 0, 64])).unwrap();
        assert_eq!(raw.samples.len(), 2);
    }

    #[test]
    fn rejects_non_riff() {
        assert!(matches!(parse_wav(b"OggS...."), Err(WavError::NotRiff)));
        assert!(matches!(
            parse_wav(b"RIFF\0\0\0\0AVI LIST"),
            Err(WavError::NotWave)
        ));
    }

    #[test]
    fn rejects_unsupported_format() {
        let err = parse_wav(&wav_bytes(0x0055, 1, 8000, 16, &[0, 0])).unwrap_err();
        assert!(matches!(err, WavError::Unsupported { format: 0x0055, bits: 16 }));
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_data_chunk() {
        let mut bytes = wav_bytes(FORMAT_PCM, 1, 8000, 16, &[]);
        bytes.truncate(36);
        assert!(matches!(parse_wav(&bytes), Err(WavError::MissingData)));
    }

    #[test]
    fn save_and_capture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let wf = crate::synth::sine(800, 8000, 100.0, 0.5);
        save_waveform(&path, &wf).unwrap();

        let source = WavFileSource::new(&path);
        assert!(source.is_available());
        assert_eq!(source.name(), "wav_file");
        let raw = source.capture().unwrap();
        assert_eq!(raw.channels, 1);
        assert_eq!(raw.frames(), 800);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = WavFileSource::new("/nonexistent/enginedoctor.wav")
            .capture()
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn header_overflow_is_rejected() {
        let mut buf = Vec::new();
        let err = write_pcm16_wav(&mut buf, &[0.0; 4], 2, 3_000_000_000).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(buf.is_empty());

        let err = write_pcm16_wav(&mut buf, &[0.0; 4], 40_000, 8000).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
