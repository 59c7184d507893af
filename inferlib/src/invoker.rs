use crate::config::Config;
use crate::errors::{JobError, Result};
use crate::events::ProcessOutcome;
use crate::types::{Args, OutputBlob, Program};

use bytes::BytesMut;
use std::{ffi::OsString, path::Path, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process, time,
};
use tracing::{debug, warn};

/// Runs the external model tool once per call and waits for it to finish.
///
/// The argument vector is fixed:
/// `<program> <args...> --folders <input dir> --predictions_json <artifact>`.
/// Exit codes are reported, not judged; deciding what a non-zero exit means is the caller's job.
#[derive(Clone, Debug)]
pub struct Invoker {
    program: Program,
    args: Args,
    timeout: Duration,
}

impl Invoker {
    pub fn new(program: Program, args: Args, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.model_program.clone(),
            config.model_args.clone(),
            config.timeout,
        )
    }

    pub fn command_args(&self, input_dir: &Path, artifact_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push("--folders".into());
        args.push(input_dir.into());
        args.push("--predictions_json".into());
        args.push(artifact_path.into());
        args
    }

    pub async fn invoke(&self, input_dir: &Path, artifact_path: &Path) -> Result<ProcessOutcome> {
        let args = self.command_args(input_dir, artifact_path);
        debug!(program = %self.program, ?args, "spawning model process");

        let mut command = process::Command::new(&self.program);
        let mut child = command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // a dropped job must not leave the model running
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // drain both pipes while waiting, a chatty child would block on a full pipe otherwise
        let finished = time::timeout(self.timeout, async {
            tokio::join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        match finished {
            Ok((Ok(status), stdout, stderr)) => Ok(ProcessOutcome {
                status: status.into(),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            }),
            Ok((Err(source), _, _)) => Err(self.spawn_error(source)),
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout = ?self.timeout,
                    "model process timed out, killing it"
                );
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill timed out model process");
                }
                Err(JobError::Timeout(self.timeout))
            }
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> JobError {
        JobError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

/// Read a pipe to EOF. Read errors end the capture early rather than failing the job.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> OutputBlob {
    let mut buf = BytesMut::with_capacity(4096);
    if let Some(mut pipe) = pipe {
        loop {
            match pipe.read_buf(&mut buf).await {
                Ok(n) if n > 0 => {}
                _ => break,
            }
        }
    }
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ExitStatus;
    use std::path::PathBuf;

    fn sh(script: &str, timeout: Duration) -> Invoker {
        Invoker::new(
            "sh".into(),
            vec!["-c".into(), script.into(), "stub-model".into()],
            timeout,
        )
    }

    #[test]
    fn argument_vector_is_fixed() {
        let invoker = Invoker::new(
            "python3".into(),
            vec!["-m".into(), "speciesnet.scripts.run_model".into()],
            Config::DEFAULT_TIMEOUT,
        );
        let args = invoker.command_args(Path::new("/w/images"), Path::new("/w/predictions.json"));
        assert_eq!(
            args,
            vec![
                OsString::from("-m"),
                "speciesnet.scripts.run_model".into(),
                "--folders".into(),
                "/w/images".into(),
                "--predictions_json".into(),
                "/w/predictions.json".into(),
            ]
        );
    }

    #[tokio::test]
    async fn passes_paths_and_captures_output() {
        let invoker = sh(
            r#"printf '%s|%s' "$2" "$4"; printf 'warming up' >&2"#,
            Duration::from_secs(10),
        );
        let outcome = invoker
            .invoke(Path::new("/in"), &PathBuf::from("/out.json"))
            .await
            .unwrap();
        assert_eq!(outcome.status, ExitStatus::Exited { code: 0 });
        assert_eq!(outcome.stdout, "/in|/out.json");
        assert_eq!(outcome.stderr, "warming up");
    }

    #[tokio::test]
    async fn nonzero_exit_is_still_an_outcome() {
        let invoker = sh("printf 'model load failed' >&2; exit 1", Duration::from_secs(10));
        let outcome = invoker
            .invoke(Path::new("/in"), Path::new("/out.json"))
            .await
            .unwrap();
        assert_eq!(outcome.status, ExitStatus::Exited { code: 1 });
        assert_eq!(outcome.stderr, "model load failed");
        assert!(outcome.stdout.is_empty());
    }

    #[tokio::test]
    async fn captures_output_larger_than_a_pipe_buffer() {
        let invoker = sh(
            "head -c 200000 /dev/zero | tr '\\0' 'x'",
            Duration::from_secs(10),
        );
        let outcome = invoker
            .invoke(Path::new("/in"), Path::new("/out.json"))
            .await
            .unwrap();
        assert_eq!(outcome.stdout.len(), 200000);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let invoker = Invoker::new(
            "/nonexistent/speciesnet-model".into(),
            vec![],
            Duration::from_secs(10),
        );
        let err = invoker
            .invoke(Path::new("/in"), Path::new("/out.json"))
            .await
            .unwrap_err();
        match err {
            JobError::Spawn { program, .. } => {
                assert_eq!(program, "/nonexistent/speciesnet-model")
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn deadline_kills_the_process() {
        let invoker = sh("sleep 30", Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = invoker
            .invoke(Path::new("/in"), Path::new("/out.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Timeout(t) if t == Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
