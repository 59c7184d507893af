use crate::types::{Args, Program};
use std::{path::PathBuf, time::Duration};

/// Coordinator configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Executable that runs the classification model.
    pub model_program: Program,
    /// Leading arguments, placed before `--folders` and `--predictions_json`.
    pub model_args: Args,
    /// Directory under which per-job workspaces are created.
    pub workspace_root: PathBuf,
    /// Deadline for a single model invocation.
    pub timeout: Duration,
    pub max_concurrent_jobs: usize,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
    pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

    pub fn new(model_program: impl Into<Program>) -> Self {
        Self {
            model_program: model_program.into(),
            model_args: Args::new(),
            workspace_root: std::env::temp_dir(),
            timeout: Self::DEFAULT_TIMEOUT,
            max_concurrent_jobs: Self::DEFAULT_MAX_CONCURRENT_JOBS,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to at least one, a zero-sized pool would never run anything.
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }
}
