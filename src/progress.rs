use std::io::{IsTerminal, Write};
use std::time::Duration;

/// Prints upload progress whenever the whole percentage goes up
pub struct ProgressReporter {
    last_percent: u64,
    interactive: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_terminal(std::io::stdout().is_terminal())
    }

    fn with_terminal(interactive: bool) -> Self {
        Self {
            last_percent: 0,
            interactive,
        }
    }

    /// Record progress, returning the message if it should be shown
    fn advance(&mut self, current: u64, total: u64) -> Option<String> {
        if total == 0 {
            return None;
        }
        let percent = current * 100 / total;
        if percent <= self.last_percent {
            return None;
        }
        self.last_percent = percent;

        Some(format!(
            "Uploading... ({} KB / {} KB uploaded, {}%)",
            current / 1024,
            total / 1024,
            percent
        ))
    }

    pub fn update(&mut self, current: u64, total: u64) {
        let Some(msg) = self.advance(current, total) else {
            return;
        };

        if self.interactive {
            // Rewrite the current line in place
            print!("\x1b[K{}\r", msg);
            let _ = std::io::stdout().flush();
        } else {
            tracing::info!("{}", msg);
        }
    }

    /// Move past the progress line
    pub fn finish(&self) {
        if self.interactive {
            println!();
        }
    }
}

/// One-line summary of a finished upload
pub fn upload_summary(size: u64, elapsed: Duration, watch_url: &str) -> String {
    let megabytes = size as f64 / (1024.0 * 1024.0);
    let minutes_per_100mb = elapsed.as_secs_f64() / 60.0 * 100.0 / megabytes;
    format!(
        "Uploaded {:.1} MB in {:?}, {:.1} minutes for 100MB : {}",
        megabytes, elapsed, minutes_per_100mb, watch_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_when_percentage_increases() {
        let mut reporter = ProgressReporter::with_terminal(false);

        assert_eq!(
            reporter.advance(512 * 1024, 1024 * 1024).as_deref(),
            Some("Uploading... (512 KB / 1024 KB uploaded, 50%)")
        );
        assert_eq!(reporter.advance(512 * 1024 + 10, 1024 * 1024), None);
        assert_eq!(reporter.advance(100, 1024 * 1024), None);
        assert!(reporter.advance(1024 * 1024, 1024 * 1024).is_some());
    }

    #[test]
    fn zero_total_reports_nothing() {
        let mut reporter = ProgressReporter::with_terminal(false);
        assert_eq!(reporter.advance(0, 0), None);
    }

    #[test]
    fn summary_scales_to_100mb() {
        let summary = upload_summary(
            50 * 1024 * 1024,
            Duration::from_secs(60),
            "https://youtube.com/watch?v=abc",
        );
        assert_eq!(
            summary,
            "Uploaded 50.0 MB in 60s, 2.0 minutes for 100MB : https://youtube.com/watch?v=abc"
        );
    }
}
