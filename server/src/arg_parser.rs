use clap::Parser;
use inferlib::Config;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Serve species predictions over gRPC
#[derive(Debug, Parser)]
pub struct ServerArgs {
    /// Address to bind
    #[clap(long, env = "SPECIESNET_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[clap(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Executable that runs the classification model
    #[clap(long, env = "SPECIESNET_PROGRAM", default_value = "python3")]
    pub model_program: String,

    /// Leading argument for the model executable, repeat for several.
    /// `--folders` and `--predictions_json` are always appended.
    #[clap(
        long = "model-arg",
        allow_hyphen_values = true,
        multiple_occurrences = true,
        default_values = &["-m", "speciesnet.scripts.run_model"]
    )]
    pub model_args: Vec<String>,

    /// Directory for per-job workspaces, defaults to the system temp dir
    #[clap(long, env = "SPECIESNET_WORKSPACE", parse(from_os_str))]
    pub workspace_root: Option<PathBuf>,

    /// Seconds a single model run may take before it is killed
    #[clap(long, default_value = "600")]
    pub timeout_secs: u64,

    /// Maximum number of model runs in flight
    #[clap(long, default_value = "4")]
    pub max_jobs: usize,

    /// PEM certificate, enables TLS together with --tls-key
    #[clap(long, parse(from_os_str))]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key
    #[clap(long, parse(from_os_str))]
    pub tls_key: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum ArgsError {
    #[error("--tls-cert and --tls-key must be given together")]
    PartialTls,
}

pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl ServerArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn coordinator_config(&self) -> Config {
        let mut config = Config::new(self.model_program.clone())
            .with_args(self.model_args.iter().cloned())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_concurrent_jobs(self.max_jobs);
        if let Some(root) = &self.workspace_root {
            config = config.with_workspace_root(root);
        }
        config
    }

    pub fn tls_files(&self) -> Result<Option<TlsFiles>, ArgsError> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Ok(Some(TlsFiles {
                cert: cert.clone(),
                key: key.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(ArgsError::PartialTls),
        }
    }
}
