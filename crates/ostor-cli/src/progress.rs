//! Status reporting for long-running CLI operations.
//!
//! Benchmarks run for tens of seconds with no intermediate output, so the
//! perf command keeps a status line on stderr while each test is in flight.
//! Everything here writes to stderr only; structured stdout output is never
//! interleaved with it.

use std::io::Write;
use std::time::{Duration, Instant};

/// A single in-flight status line on stderr.
///
/// Shown while one benchmark kind is running and replaced by a completion
/// line (or cleared) when it finishes.
pub struct StatusLine {
    label: String,
    start: Instant,
    enabled: bool,
}

impl StatusLine {
    /// Start a new status line with the given label.
    pub fn start(label: impl Into<String>, enabled: bool) -> Self {
        let line = Self {
            label: label.into(),
            start: Instant::now(),
            enabled,
        };
        if line.enabled {
            let _ = write!(std::io::stderr(), "{} ...", line.label);
            let _ = std::io::stderr().flush();
        }
        line
    }

    /// Elapsed time since the line was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Replace the line with a completion message.
    pub fn finish(self) {
        if self.enabled {
            let _ = writeln!(
                std::io::stderr(),
                "\r\x1b[K{}: done in {:.1}s",
                self.label,
                self.start.elapsed().as_secs_f64()
            );
        }
    }

    /// Clear the line without printing a completion message.
    pub fn clear(self) {
        if self.enabled {
            let _ = write!(std::io::stderr(), "\r\x1b[K");
            let _ = std::io::stderr().flush();
        }
    }
}

/// Elapsed-time reporter for profiling a whole command.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer with the given label.
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Elapsed duration.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and print the elapsed time to stderr.
    pub fn stop(self) {
        eprintln!("> Time {}: {:.3}s", self.label, self.start.elapsed().as_secs_f64());
    }
}
