//! Import job lifecycle
//!
//! One job represents one user-initiated spreadsheet upload attempt. Jobs
//! live for a single session: created when the validator accepts a file,
//! discarded once reconciliation has run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Terminal and in-flight states of an import job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    /// Accepted by the validator, upload not yet resolved
    Pending,
    /// Every row imported
    Succeeded,
    /// Transport succeeded, some rows rejected
    Partial,
    /// Batch failed as a whole (validation, transport, or server failure)
    Failed,
}

impl JobState {
    /// Whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

/// Handle on the spreadsheet the user selected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetFile {
    /// Path on the local filesystem
    pub path: PathBuf,
    /// File name as shown to the user
    pub file_name: String,
    /// Size in bytes
    pub size: u64,
}

impl SpreadsheetFile {
    /// Describe a file from its path and size
    ///
    /// The size is taken as given so validation stays a pure check; the
    /// composition root stats the file once.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            size,
        }
    }

    /// Describe an existing file, reading its size from the filesystem
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        Ok(Self::new(path, size))
    }

    /// Lowercased extension, empty when the file has none
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// One user-initiated import attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    /// Unique job identifier
    pub job_id: Uuid,
    /// The spreadsheet being imported
    pub file: SpreadsheetFile,
    /// Actor label attached to the upload (`utilisateur` field)
    pub actor: String,
    /// When the validator accepted the file
    pub created_at: DateTime<Utc>,
    /// Current state
    pub state: JobState,
}

impl ImportJob {
    /// Create a new pending job for a validated file
    pub fn new(file: SpreadsheetFile, actor: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            file,
            actor: actor.into(),
            created_at: Utc::now(),
            state: JobState::Pending,
        }
    }

    /// Move the job to a terminal state
    pub fn finish(&mut self, state: JobState) {
        debug_assert!(state.is_terminal());
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        let file = SpreadsheetFile::new("/tmp/Titres.XLSX", 1024);
        assert_eq!(file.extension(), "xlsx");
        assert_eq!(file.file_name, "Titres.XLSX");
    }

    #[test]
    fn test_missing_extension_is_empty() {
        let file = SpreadsheetFile::new("/tmp/titres", 1024);
        assert_eq!(file.extension(), "");
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = ImportJob::new(SpreadsheetFile::new("/tmp/t.xlsx", 10), "agent");
        assert_eq!(job.state, JobState::Pending);
        assert!(!job.state.is_terminal());
    }

    #[test]
    fn test_finish_moves_to_terminal() {
        let mut job = ImportJob::new(SpreadsheetFile::new("/tmp/t.xlsx", 10), "agent");
        job.finish(JobState::Partial);
        assert_eq!(job.state, JobState::Partial);
        assert!(job.state.is_terminal());
    }
}
