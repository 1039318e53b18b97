use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TeardownError;

const CREATING: &str = "creating";

/// One entry of `deployment.pending_operations` in an exported stack state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub resource: String,
    pub kind: String,
}

impl PendingOperation {
    /// Pulumi exports the resource as a full state object; older exports and
    /// hand-edited files carry a bare URN string instead.
    fn from_value(value: &Value) -> Self {
        let resource = match value.get("resource") {
            Some(Value::String(urn)) => urn.clone(),
            Some(Value::Object(state)) => state
                .get("urn")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(state.clone()).to_string()),
            Some(other) => other.to_string(),
            None => String::from("<unknown resource>"),
        };
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { resource, kind }
    }

    pub fn is_create(&self) -> bool {
        self.kind == CREATING
    }
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.resource, self.kind)
    }
}

/// Local file holding an exported stack state.
///
/// The file is removed when the guard is dropped, so it cannot outlive the
/// step that created it, whichever way that step ends. The guard is only
/// handed out for a path with nothing on it yet, so it never deletes a file
/// it did not create.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Take over `path` for an export. Fails if anything already exists there.
    pub fn claim(path: PathBuf) -> Result<Self, TeardownError> {
        if path.exists() {
            return Err(TeardownError::snapshot(
                &path,
                "file already exists, move it aside and run again",
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name relative to the project root, as handed to `pulumi`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Drop `deployment.pending_operations` from the snapshot on disk.
    ///
    /// Refuses with [`TeardownError::PendingCreateOperations`] when a create is
    /// still in flight, unless `ignore_creates` is set. Returns the operations
    /// that were removed.
    pub async fn strip_pending_operations(
        &self,
        ignore_creates: bool,
    ) -> Result<Vec<PendingOperation>, TeardownError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TeardownError::snapshot(&self.path, e))?;
        let mut state: Value =
            serde_json::from_str(&content).map_err(|e| TeardownError::snapshot(&self.path, e))?;

        let removed = strip_pending_operations(&mut state, ignore_creates)
            .map_err(|e| match e {
                StripError::MissingDeployment => {
                    TeardownError::snapshot(&self.path, "no `deployment` section in export")
                }
                StripError::PendingCreates(operations) => {
                    TeardownError::PendingCreateOperations { operations }
                }
            })?;

        let content = serde_json::to_string_pretty(&state)
            .map_err(|e| TeardownError::snapshot(&self.path, e))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| TeardownError::snapshot(&self.path, e))?;

        debug!(
            "Removed {} pending operation(s) from {}",
            removed.len(),
            self.path.display()
        );
        Ok(removed)
    }
}

impl Drop for SnapshotFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Deleted {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete {}: {}", self.path.display(), e),
        }
    }
}

#[derive(Debug)]
enum StripError {
    MissingDeployment,
    PendingCreates(Vec<PendingOperation>),
}

fn strip_pending_operations(
    state: &mut Value,
    ignore_creates: bool,
) -> Result<Vec<PendingOperation>, StripError> {
    let deployment = state
        .get_mut("deployment")
        .and_then(Value::as_object_mut)
        .ok_or(StripError::MissingDeployment)?;

    let operations: Vec<PendingOperation> = deployment
        .get("pending_operations")
        .and_then(Value::as_array)
        .map(|ops| ops.iter().map(PendingOperation::from_value).collect())
        .unwrap_or_default();

    if !ignore_creates {
        let creates: Vec<PendingOperation> = operations
            .iter()
            .filter(|op| op.is_create())
            .cloned()
            .collect();
        if !creates.is_empty() {
            return Err(StripError::PendingCreates(creates));
        }
    }

    deployment.remove("pending_operations");
    Ok(operations)
}
