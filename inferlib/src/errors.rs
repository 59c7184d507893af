use crate::events::ExitStatus;
use std::{io, path::PathBuf, result, time::Duration};
use thiserror::Error;

/// Every way a job can fail. None of these are retried.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("job workspace error: {0}")]
    Workspace(#[source] io::Error),
    #[error("failed to start model process `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("model process {status}: {stderr}")]
    ExternalProcess {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[error("model process exited cleanly but wrote no artifact at {}", path.display())]
    MissingArtifact { path: PathBuf },
    #[error("malformed prediction artifact {}: {reason}", path.display())]
    MalformedResult { path: PathBuf, reason: String },
    #[error("prediction artifact has no entry for asset {asset}")]
    MissingEntry { asset: String },
    #[error("model process timed out after {0:?}")]
    Timeout(Duration),
}

impl JobError {
    /// True when the caller sent something unusable, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, JobError::InvalidInput(_))
    }
}

pub type Result<T> = result::Result<T, JobError>;
