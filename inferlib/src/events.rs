use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process;

/// How the model process terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Exited { code: i32 },
    Killed { signal: i32 },
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited { code: 0 })
    }
}

impl From<process::ExitStatus> for ExitStatus {
    fn from(status: process::ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitStatus::Exited { code },
            (None, Some(signal)) => ExitStatus::Killed { signal },
            // neither a code nor a signal only happens on platforms we don't build for
            (None, None) => ExitStatus::Exited { code: -1 },
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited { code } => write!(f, "exited with code {}", code),
            ExitStatus::Killed { signal } => write!(f, "killed by signal {}", signal),
        }
    }
}

/// Everything observed about a finished model process.
#[derive(Clone, Debug)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Terminal state of a job, used for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    Failed,
}

impl<T, E> From<&Result<T, E>> for JobStatus {
    fn from(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => JobStatus::Succeeded,
            Err(_) => JobStatus::Failed,
        }
    }
}
