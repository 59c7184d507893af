use crate::config::Config;
use crate::errors::{JobError, Result};
use crate::events::JobStatus;
use crate::invoker::Invoker;
use crate::reader;
use crate::types::{JobId, Prediction};
use crate::workspace::Workspace;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Runs classification jobs: one workspace, one model invocation, one artifact per job.
///
/// Cheap to clone; clones share the configuration and the concurrency limit. Jobs never share any
/// other state, each one gets its own workspace named after a fresh job id.
#[derive(Clone, Debug)]
pub struct JobCoordinator {
    config: Arc<Config>,
    invoker: Invoker,
    permits: Arc<Semaphore>,
}

/// One request's execution. Lives for the duration of a single `run_job` call.
struct Job {
    id: JobId,
    asset_name: String,
    workspace: Workspace,
}

impl Job {
    fn start(config: &Config, id: JobId) -> Result<Self> {
        let workspace = Workspace::acquire(&config.workspace_root, id)?;
        Ok(Self {
            id,
            asset_name: asset_name(id),
            workspace,
        })
    }
}

/// The extension is part of the contract with the model tool.
pub fn asset_name(job_id: JobId) -> String {
    format!("{}.jpg", job_id.to_simple())
}

impl JobCoordinator {
    pub fn new(config: Config) -> Self {
        let invoker = Invoker::from_config(&config);
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            config: Arc::new(config),
            invoker,
            permits,
        }
    }

    /// Classify one image under a freshly generated job id.
    pub async fn run(&self, image: &[u8]) -> Result<Prediction> {
        self.run_job(Uuid::new_v4(), image).await
    }

    /// Classify one image and return the prediction record for it.
    ///
    /// The workspace is gone by the time this returns, whatever the outcome.
    pub async fn run_job(&self, job_id: JobId, image: &[u8]) -> Result<Prediction> {
        if image.is_empty() {
            return Err(JobError::InvalidInput("image upload is empty".into()));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .expect("job semaphore is never closed");
        let started = Instant::now();

        let job = Job::start(&self.config, job_id)?;
        let result = self.execute(&job, image).await;
        let Job {
            id,
            asset_name,
            workspace,
        } = job;
        workspace.release();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let status = JobStatus::from(&result);
        match &result {
            Ok(_) => info!(job_id = %id, asset = %asset_name, ?status, elapsed_ms, "job finished"),
            Err(err) => warn!(
                job_id = %id,
                asset = %asset_name,
                ?status,
                elapsed_ms,
                error = %err,
                "job finished"
            ),
        }
        result
    }

    async fn execute(&self, job: &Job, image: &[u8]) -> Result<Prediction> {
        let workspace = &job.workspace;
        workspace.write_asset(&job.asset_name, image).await?;

        let artifact_path = workspace.artifact_path();
        let outcome = self
            .invoker
            .invoke(workspace.images_dir(), &artifact_path)
            .await?;

        // an artifact left behind by a failing run is not trusted
        if !outcome.status.success() {
            error!(
                job_id = %job.id,
                status = %outcome.status,
                stdout = %outcome.stdout,
                stderr = %outcome.stderr,
                "model process failed"
            );
            return Err(JobError::ExternalProcess {
                status: outcome.status,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }

        let mut predictions = reader::read(&artifact_path).await?;
        predictions
            .remove(&job.asset_name)
            .ok_or_else(|| JobError::MissingEntry {
                asset: job.asset_name.clone(),
            })
    }
}
