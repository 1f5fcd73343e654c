//! Output formatting utilities for CLI commands.
//!
//! Provides the [`Printer`] used by all command handlers: human-readable
//! status lines (plain, green for success, red for errors) in text mode and
//! structured objects in JSON mode, plus byte-size formatting/parsing
//! helpers for the benchmark flags.

use std::fmt;
use std::io::Write;

use serde::Serialize;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable status lines.
    Text,
    /// Machine-readable JSON output.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

/// Printer that formats and writes command output.
pub struct Printer<W: Write = Box<dyn Write>> {
    stdout: W,
    format: OutputFormat,
}

impl Printer<Box<dyn Write>> {
    /// Create a new printer writing to stdout with the given format.
    pub fn stdout(format: OutputFormat) -> Self {
        Self {
            stdout: Box::new(std::io::stdout()),
            format,
        }
    }
}

impl<W: Write> Printer<W> {
    /// Create a new printer with a custom writer.
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            stdout: writer,
            format,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether the printer is in JSON mode.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a plain status line (text mode only).
    pub fn print_message(&mut self, msg: &str) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.stdout, "{}", msg),
            OutputFormat::Json => Ok(()),
        }
    }

    /// Print a success line, green and bold in text mode.
    pub fn print_success(&mut self, msg: &str) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.stdout, "{}", console::style(msg).green().bold())
            }
            OutputFormat::Json => Ok(()),
        }
    }

    /// Print an error line, red in text mode, `{"error": ...}` in JSON mode.
    pub fn print_error(&mut self, err: &str) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.stdout, "{}", console::style(format!("Error: {}", err)).red())
            }
            OutputFormat::Json => {
                let obj = serde_json::json!({ "error": err });
                writeln!(self.stdout, "{}", obj)
            }
        }
    }

    /// Print a serializable value as pretty JSON (JSON mode only).
    pub fn print_value<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => Ok(()),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
                writeln!(self.stdout, "{}", json)
            }
        }
    }
}

impl<W: Write> fmt::Debug for Printer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer").field("format", &self.format).finish()
    }
}

/// Format bytes in a human-friendly way (e.g., "1.5 GiB").
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;
    const TIB: u64 = 1024 * GIB;

    if bytes >= TIB {
        format!("{:.2} TiB", bytes as f64 / TIB as f64)
    } else if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Parse a byte-size flag value such as `64MiB`, `1GiB`, `4MB` or `1024`.
///
/// Binary suffixes (KiB/MiB/GiB/TiB) use powers of 1024, decimal suffixes
/// (KB/MB/GB/TB) powers of 1000; a bare number is taken as bytes.
pub fn parse_bytes(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num, suffix) = s.split_at(split);

    let value: f64 = num
        .parse()
        .map_err(|_| format!("invalid size '{}'", s))?;

    let multiplier: u64 = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        "kb" | "k" => 1_000,
        "mb" | "m" => 1_000_000,
        "gb" | "g" => 1_000_000_000,
        "tb" | "t" => 1_000_000_000_000,
        _ => return Err(format!("invalid size suffix in '{}'", s)),
    };

    Ok((value * multiplier as f64) as u64)
}
