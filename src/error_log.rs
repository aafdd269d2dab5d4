use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Append-only failure journal, separate from the stderr logger so a run
/// leaves a reviewable trace on disk.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: PathBuf) -> Self {
        ErrorLog { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A failed write must never take the batch down with it; it falls back
    /// to stderr and the run continues.
    pub fn append(&self, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "[{}] {}\n", timestamp, message));

        if let Err(e) = result {
            log::error!(
                "Could not write to error log file '{}': {}. Original message: {}",
                self.path.display(),
                e,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorLog;

    pub fn entry_count(log: &ErrorLog) -> usize {
        match std::fs::read_to_string(log.path()) {
            Ok(contents) => contents.lines().filter(|l| l.starts_with('[')).count(),
            Err(_) => 0,
        }
    }

    #[test]
    fn appends_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));

        log.append("first failure");
        log.append("second failure");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(entry_count(&log), 2);
        assert!(contents.contains("first failure"));
        assert!(contents.contains("second failure"));
    }

    #[test]
    fn entries_are_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));

        log.append("something broke");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let first_line = contents.lines().next().unwrap();
        assert!(first_line.starts_with('['));
        assert!(first_line.contains("] something broke"));
    }
}
