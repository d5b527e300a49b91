//! Run-scoped file log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{IntakeError, IntakeResult};

pub const LOG_FILE_NAME: &str = "udm-intake.log";

/// A log file scoped to one run, held by the pipeline driver and flushed on
/// completion or failure. Lines mirror onto the `log` facade so `RUST_LOG`
/// output stays useful.
pub struct RunLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RunLog {
    pub fn create(path: &Path) -> IntakeResult<Self> {
        let file = File::create(path).map_err(|source| IntakeError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(RunLog {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.write_line("INFO", message);
    }

    pub fn error(&mut self, message: &str) {
        log::error!("{message}");
        self.write_line("ERROR", message);
    }

    fn write_line(&mut self, level: &str, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        // A log line that cannot be written must not fail the run.
        let _ = writeln!(self.writer, "{timestamp} - {level} - {message}");
    }

    pub fn flush(&mut self) -> IntakeResult<()> {
        self.writer
            .flush()
            .map_err(|source| IntakeError::WriteFailure {
                path: self.path.clone(),
                source,
            })
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
