//! Rotating JSON-lines file sink.
//!
//! Records are appended one JSON object per line. The file rotates at UTC
//! midnight (renamed with a date suffix, e.g. `access.log.2026-08-06`) and
//! when it exceeds `max_file_size_bytes`. Old rotated files beyond
//! `max_rotated_files` are pruned.
//!
//! Thread-safe: a `Mutex<BufWriter>` serialises writes from concurrent
//! request tasks.

use crate::record::AccessLogRecord;
use crate::sink::LogSink;
use chrono::{NaiveDate, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use wiretap_core::config::FileSinkConfig;
use wiretap_core::error::WiretapError;

pub struct FileSink {
    config: FileSinkConfig,
    inner: Mutex<WriterState>,
}

struct WriterState {
    writer: BufWriter<File>,
    current_date: NaiveDate,
    current_size: u64,
}

impl FileSink {
    /// Open (or create) the access-log file. Parent directories are created
    /// as needed.
    pub fn new(config: FileSinkConfig) -> Result<Self, WiretapError> {
        let path = Path::new(&config.path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let current_size = file.metadata()?.len();

        info!(path = %config.path, "Access log file sink opened");

        Ok(Self {
            config,
            inner: Mutex::new(WriterState {
                writer: BufWriter::new(file),
                current_date: Utc::now().date_naive(),
                current_size,
            }),
        })
    }

    /// Append one JSON line, rotating first if needed.
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("file sink lock poisoned"))?;

        let today = Utc::now().date_naive();
        let date_rollover = today != state.current_date;
        let size_rollover = self.config.max_file_size_bytes > 0
            && state.current_size >= self.config.max_file_size_bytes;

        if date_rollover || size_rollover {
            self.rotate(&mut state, date_rollover, today)?;
        }

        let bytes = line.as_bytes();
        state.writer.write_all(bytes)?;
        state.writer.write_all(b"\n")?;
        state.writer.flush()?;
        state.current_size += bytes.len() as u64 + 1;
        Ok(())
    }

    fn rotate(&self, state: &mut WriterState, date_rollover: bool, today: NaiveDate) -> io::Result<()> {
        state.writer.flush()?;

        let suffix = if date_rollover {
            state.current_date.format("%Y-%m-%d").to_string()
        } else {
            Utc::now().format("%Y-%m-%d-%H%M%S").to_string()
        };

        let base = Path::new(&self.config.path);
        let rotated = rotated_path(base, &suffix);
        if base.exists() {
            match fs::rename(base, &rotated) {
                Ok(()) => info!(to = %rotated.display(), "Rotated access log"),
                Err(e) => error!(error = %e, to = %rotated.display(), "Failed to rotate access log"),
            }
        }

        if self.config.max_rotated_files > 0 {
            if let Err(e) = prune_rotated(base, self.config.max_rotated_files) {
                warn!(error = %e, "Failed to prune old access log files");
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(base)?;
        state.writer = BufWriter::new(file);
        state.current_date = today;
        state.current_size = 0;
        Ok(())
    }

    /// Flush buffered data to disk.
    pub fn flush(&self) -> Result<(), WiretapError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| WiretapError::SinkError("file sink lock poisoned".into()))?;
        state.writer.flush()?;
        Ok(())
    }
}

impl LogSink for FileSink {
    fn emit(&self, record: &AccessLogRecord) {
        // Write failures must never reach the request path.
        if let Err(e) = self.write_line(&record.to_json_line()) {
            error!(error = %e, "Dropped access log record on write failure");
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// `access.log` → `access.log.2026-08-06`.
fn rotated_path(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

/// Remove old rotated files, keeping only the newest `keep`.
fn prune_rotated(base_path: &Path, keep: usize) -> io::Result<()> {
    let parent = base_path.parent().unwrap_or(Path::new("."));
    let base_name = base_path.file_name().unwrap_or_default().to_string_lossy();

    let mut rotated: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&*base_name)
            && name.len() > base_name.len()
            && name.as_bytes()[base_name.len()] == b'.'
        {
            rotated.push(entry.path());
        }
    }

    // Date suffixes sort lexicographically — newest last
    rotated.sort();

    if rotated.len() > keep {
        for path in rotated.iter().take(rotated.len() - keep) {
            debug!(path = %path.display(), "Pruning old rotated access log");
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
