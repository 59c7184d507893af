use crate::errors::{JobError, Result};
use crate::types::PredictionResult;
use std::{io, path::Path};
use tokio::fs;

/// Load the artifact written by the model tool.
///
/// The whole file is read into memory and must hold a single JSON object. Record contents are not
/// inspected.
pub async fn read(artifact_path: &Path) -> Result<PredictionResult> {
    let contents = match fs::read(artifact_path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(JobError::MissingArtifact {
                path: artifact_path.to_path_buf(),
            })
        }
        Err(err) => return Err(malformed(artifact_path, err)),
    };
    serde_json::from_slice(&contents).map_err(|err| malformed(artifact_path, err))
}

fn malformed(path: &Path, reason: impl ToString) -> JobError {
    JobError::MalformedResult {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
