use std::fmt;
use std::path::PathBuf;

use crate::teardown::snapshot::PendingOperation;

/// Failures that abort a teardown run.
///
/// Every variant is fatal: the remaining steps are skipped and nothing that
/// already ran is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum TeardownError {
    #[error("No project name given")]
    MissingProjectName,

    #[error(
        "There are pending create operations. Please remove them before destroying the stack:\n{}",
        OperationList(.operations)
    )]
    PendingCreateOperations { operations: Vec<PendingOperation> },

    #[error("Failed to run `{command}`")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status})")]
    CommandFailed { command: String, status: String },

    #[error("S3 {operation} failed for s3://{bucket}/{key}: {message}")]
    Storage {
        operation: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("State snapshot {}: {message}", .path.display())]
    Snapshot { path: PathBuf, message: String },
}

impl TeardownError {
    pub fn snapshot(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Snapshot {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

struct OperationList<'a>(&'a [PendingOperation]);

impl fmt::Display for OperationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {} ({})", op.resource, op.kind)?;
        }
        Ok(())
    }
}
