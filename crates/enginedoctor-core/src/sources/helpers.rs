//! Shared helpers for sources that shell out to external programs.

use std::process::{Command, Stdio};

/// Check whether a program is on `PATH`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a program and return its stdout, or an error carrying its stderr.
pub fn run_capture(program: &str, args: &[&str]) -> std::io::Result<Vec<u8>> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(std::io::Error::other(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

/// Interpret raw bytes as little-endian `f32` samples. A trailing partial
/// sample is ignored.
pub fn f32le_to_samples(raw: &[u8]) -> Vec<f64> {
    raw.chunks_exact(4)
        .map(|b| f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_exists_true() {
        assert!(command_exists("echo"));
    }

    #[test]
    fn command_exists_false() {
        assert!(!command_exists("nonexistent_binary_xyz_12345"));
    }

    #[test]
    fn run_capture_returns_stdout() {
        let out = run_capture("echo", &["hello"]).unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "hello");
    }

    #[test]
    fn run_capture_reports_failure() {
        assert!(run_capture("false", &[]).is_err());
        assert!(run_capture("nonexistent_binary_xyz_12345", &[]).is_err());
    }

    #[test]
    fn f32le_decoding() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0.5f32.to_le_bytes());
        raw.extend_from_slice(&(-0.25f32).to_le_bytes());
        raw.push(0xAA);
        assert_eq!(f32le_to_samples(&raw), vec![0.5, -0.25]);
    }
}
