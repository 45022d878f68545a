//! Terminal rendering for diagnoses.

use enginedoctor_core::presentation::{DEFAULT_DECIMATION, decimate, format_score};
use enginedoctor_core::{DiagnosticReport, HealthLabel, TurbulenceBreakdown, Waveform};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the waveform sparkline, in characters.
pub const SPARKLINE_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnoseView {
    Summary,
    Detailed,
}

impl DiagnoseView {
    pub fn parse(s: &str) -> Self {
        match s {
            "detailed" => Self::Detailed,
            _ => Self::Summary,
        }
    }
}

fn status_icon(label: HealthLabel) -> &'static str {
    match label {
        HealthLabel::Healthy => "\u{2705}",
        HealthLabel::Warning => "\u{26A0}\u{FE0F}",
        HealthLabel::Critical => "\u{1F6A8}",
    }
}

/// Peak-amplitude sparkline of a waveform, `width` characters wide.
///
/// The waveform is decimated first, then each column shows the largest
/// absolute sample in its bucket relative to the loudest bucket.
pub fn sparkline(waveform: &Waveform, width: usize) -> String {
    let points = decimate(&waveform.samples, DEFAULT_DECIMATION);
    if points.is_empty() || width == 0 {
        return String::new();
    }
    let bucket = points.len().div_ceil(width);
    let peaks: Vec<f64> = points
        .chunks(bucket)
        .map(|c| c.iter().fold(0.0_f64, |m, s| m.max(s.abs())))
        .collect();
    let top = peaks.iter().copied().fold(0.0_f64, f64::max);
    peaks
        .iter()
        .map(|&p| {
            if top <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let level = ((p / top) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Horizontal bar for one chunk score, scaled against `max`.
fn score_bar(score: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let filled = ((score / max) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

pub fn print_report(report: &DiagnosticReport, waveform: &Waveform, view: DiagnoseView) {
    let result = &report.result;
    let name = report.source.as_deref().unwrap_or("recording");

    println!();
    println!(
        "  ┌─ {name} ({:.2} s @ {} Hz, {} ch)",
        report.duration_secs, report.sample_rate, report.channels
    );
    println!(
        "  │ Result:      {} {}",
        status_icon(result.label),
        report.headline
    );
    println!(
        "  │ Turbulence:  {}",
        format_score(result.turbulence_variance)
    );
    println!("  │ Intensity:   {}", format_score(result.average_intensity));
    println!("  │ Diagnosis:   {}", report.diagnosis);
    let line = sparkline(waveform, SPARKLINE_WIDTH);
    if !line.is_empty() {
        println!("  │ Waveform:    {line}");
    }
    if report.breakdown.is_degenerate() {
        println!(
            "  │ Note:        recording too short to score ({} samples)",
            report.breakdown.sample_count
        );
    }
    println!("  └─");

    if view == DiagnoseView::Detailed {
        print_chunk_table(&report.breakdown);
    }
}

fn print_chunk_table(breakdown: &TurbulenceBreakdown) {
    let max = breakdown
        .chunks
        .iter()
        .filter_map(|c| c.chaos)
        .fold(0.0_f64, f64::max);

    println!();
    println!(
        "  {:>5}  {:>9}  {:>7}  {:>7}",
        "chunk", "offset", "len", "chaos"
    );
    for chunk in &breakdown.chunks {
        match chunk.chaos {
            Some(score) => println!(
                "  {:>5}  {:>9}  {:>7}  {:>7}  {}",
                chunk.index,
                chunk.offset,
                chunk.len,
                format_score(score),
                score_bar(score, max, 30)
            ),
            None => println!(
                "  {:>5}  {:>9}  {:>7}  {:>7}",
                chunk.index, chunk.offset, chunk.len, "skipped"
            ),
        }
    }
    println!();
    println!(
        "  {} of {} chunks scored, chunk size {}, {} trailing samples ignored",
        breakdown.scored_chunks(),
        breakdown.chunks.len(),
        breakdown.chunk_size,
        breakdown.discarded_samples
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_parse() {
        assert_eq!(DiagnoseView::parse("detailed"), DiagnoseView::Detailed);
        assert_eq!(DiagnoseView::parse("summary"), DiagnoseView::Summary);
        assert_eq!(DiagnoseView::parse("anything"), DiagnoseView::Summary);
    }

    #[test]
    fn sparkline_width_and_levels() {
        let wf = enginedoctor_core::synth::sine(44100, 44100, 440.0, 1.0);
        let line = sparkline(&wf, 60);
        assert!(line.chars().count() <= 60);
        assert!(line.chars().all(|c| SPARK_LEVELS.contains(&c)));
    }

    #[test]
    fn sparkline_shows_dropout() {
        let wf = enginedoctor_core::synth::sine(10_000, 10_000, 130.0, 1.0);
        let wf = enginedoctor_core::synth::attenuate(&wf, 0..5000, 0.0);
        let line: Vec<char> = sparkline(&wf, 10).chars().collect();
        assert_eq!(line.len(), 10);
        assert_eq!(line[0], '▁');
        assert_eq!(line[9], '█');
    }

    #[test]
    fn sparkline_of_silence_is_flat() {
        let wf = Waveform::new(vec![0.0; 500], 8000);
        assert!(sparkline(&wf, 5).chars().all(|c| c == '▁'));
        assert!(sparkline(&Waveform::new(Vec::new(), 8000), 5).is_empty());
    }

    #[test]
    fn score_bar_scales() {
        assert_eq!(score_bar(1.0, 1.0, 4), "████");
        assert_eq!(score_bar(0.5, 1.0, 4), "██");
        assert_eq!(score_bar(0.5, 0.0, 4), "");
    }
}
