use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::models::LogRecord;

/// Destination for emitted records. `LogFile` is the production
/// implementation; the seam lets the accounting engine be driven against an
/// in-memory log under test.
pub trait RecordLog {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
}

/// Append-only uptime log.
///
/// Opened once at startup and held for the process lifetime; every append is
/// flushed before the tick that produced it completes. Lines already written
/// are never revised. Fields are semicolon-separated; only the header row
/// quotes its fields.
pub struct LogFile {
    file: File,
}

impl LogFile {
    /// Opens `path` in append mode, creating it if needed. The header row is
    /// written only when the file is empty at open time, so reopening an
    /// existing log continues it seamlessly.
    pub fn open(path: &Path, columns: &[String; 7]) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat log file {}", path.display()))?
            .len();

        let mut log = Self { file };
        if len == 0 {
            log.write_header(columns)?;
        }
        Ok(log)
    }

    fn write_header(&mut self, columns: &[String; 7]) -> Result<()> {
        let row = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(";");
        writeln!(self.file, "{}", row).context("Failed to write log header")?;
        self.file.flush().context("Failed to flush log header")?;
        Ok(())
    }

    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        writeln!(
            self.file,
            "{};{};{};{};{};{};{}",
            record.timestamp.format("%Y-%m-%d"),
            record.timestamp.format("%H:%M:%S"),
            record.label,
            record.percent_up,
            record.days,
            record.hours,
            record.minutes,
        )
        .context("Failed to append record to uptime log")?;
        self.file.flush().context("Failed to flush uptime log")?;
        Ok(())
    }
}

impl RecordLog for LogFile {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        LogFile::append(self, record)
    }
}
