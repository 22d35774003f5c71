//! CLI presenter for output formatting

use std::path::Path;

use colored::*;

use crate::domain::buffer::ExportSummary;

/// Presenter for CLI output formatting
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print recorder status
    pub fn recorder_status(&self, state: &str) {
        eprintln!("{} Recorder: {}", "●".cyan(), state);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One-line description of a finished export
    pub fn format_export(&self, summary: &ExportSummary, path: &Path) -> String {
        let mut line = format!(
            "Exported {:.3}s ({} samples @ {} Hz) to {}",
            summary.duration_secs(),
            summary.samples,
            summary.sample_rate,
            path.display()
        );
        if summary.clamped > 0 {
            line.push_str(&format!(", {} clamped", summary.clamped));
        }
        line
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(samples: usize, clamped: usize) -> ExportSummary {
        ExportSummary {
            samples,
            clamped,
            sample_rate: 48_000,
        }
    }

    #[test]
    fn format_export_reports_duration_and_path() {
        let line = Presenter::new().format_export(&summary(24_000, 0), Path::new("/tmp/take.wav"));
        assert!(line.contains("0.500s"));
        assert!(line.contains("24000 samples @ 48000 Hz"));
        assert!(line.ends_with("/tmp/take.wav"));
    }

    #[test]
    fn format_export_mentions_clamping() {
        let line = Presenter::new().format_export(&summary(480, 3), Path::new("take.wav"));
        assert!(line.ends_with("3 clamped"));
    }
}
