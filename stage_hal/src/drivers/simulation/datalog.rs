//! Simulated drive-side position log.
//!
//! Mirrors the drive datalogger: a fixed-capacity sample buffer armed by
//! `start_logging`, filled while moves run, and flushed to one file per
//! axis. Each flush overwrites the previous file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Buffer has no room for another sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFull;

/// One logged sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSample {
    /// Seconds since logging was armed.
    pub elapsed_s: f64,
    /// Position in engineering units.
    pub position: f64,
}

/// Fixed-capacity position log.
#[derive(Debug)]
pub struct PositionLog {
    capacity: usize,
    armed_at: Option<Instant>,
    samples: Vec<LogSample>,
}

impl PositionLog {
    /// Create a disarmed log holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            armed_at: None,
            samples: Vec::new(),
        }
    }

    /// Buffer capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the log is currently recording.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clear the buffer, start recording and log `position` as the first sample.
    pub fn arm(&mut self, now: Instant, position: f64) -> Result<(), LogFull> {
        self.samples.clear();
        self.armed_at = Some(now);
        self.record(now, position)
    }

    /// Append a sample. A disarmed log ignores samples.
    pub fn record(&mut self, now: Instant, position: f64) -> Result<(), LogFull> {
        let Some(armed_at) = self.armed_at else {
            return Ok(());
        };
        if self.samples.len() >= self.capacity {
            return Err(LogFull);
        }
        self.samples.push(LogSample {
            elapsed_s: now.saturating_duration_since(armed_at).as_secs_f64(),
            position,
        });
        Ok(())
    }

    /// Stop recording and hand back the buffered samples.
    pub fn disarm(&mut self) -> Vec<LogSample> {
        self.armed_at = None;
        std::mem::take(&mut self.samples)
    }
}

/// Write `samples` to `path`, creating parent directories and replacing any existing file.
pub fn write_log_file(path: &Path, axis_name: &str, samples: &[LogSample]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "# {axis_name} positions")?;
    writeln!(writer, "elapsed_s,position")?;
    for sample in samples {
        writeln!(writer, "{:.6},{:.4}", sample.elapsed_s, sample.position)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_disarmed_log_ignores_samples() {
        let mut log = PositionLog::new(4);
        assert_eq!(log.record(Instant::now(), 1.0), Ok(()));
        assert!(log.is_empty());
    }

    #[test]
    fn test_arm_records_start_position() {
        let mut log = PositionLog::new(4);
        let t0 = Instant::now();
        log.arm(t0, 5.0).unwrap();
        log.record(t0 + Duration::from_millis(500), 10.0).unwrap();

        let samples = log.disarm();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].position, 5.0);
        assert!((samples[1].elapsed_s - 0.5).abs() < 1e-9);
        assert!(!log.is_armed());
    }

    #[test]
    fn test_overflow_reported() {
        let mut log = PositionLog::new(2);
        let now = Instant::now();
        log.arm(now, 0.0).unwrap();
        log.record(now, 1.0).unwrap();
        assert_eq!(log.record(now, 2.0), Err(LogFull));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_rearm_clears_previous_samples() {
        let mut log = PositionLog::new(3);
        let now = Instant::now();
        log.arm(now, 0.0).unwrap();
        log.record(now, 1.0).unwrap();
        log.arm(now, 7.0).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_write_log_file_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("axis1_positions.log");
        let sample = LogSample {
            elapsed_s: 0.25,
            position: 12.5,
        };

        write_log_file(&path, "x", &[sample, sample]).unwrap();
        write_log_file(&path, "x", &[sample]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["# x positions", "elapsed_s,position", "0.250000,12.5000"]);
    }
}
