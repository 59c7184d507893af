mod arg_parser;
mod services;

use arg_parser::{ServerArgs, TlsFiles};
use clap::Parser;
use inferlib::{Config, JobCoordinator};
use protobuf::species_net_server::SpeciesNetServer;
use services::predictor::PredictorService;
use std::net::SocketAddr;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let identity = match args.tls_files()? {
        Some(TlsFiles { cert, key }) => {
            let cert = tokio::fs::read(cert).await?;
            let key = tokio::fs::read(key).await?;
            Some(Identity::from_pem(cert, key))
        }
        None => None,
    };
    serve(args.socket_addr(), args.coordinator_config(), identity).await
}

async fn serve(
    addr: SocketAddr,
    config: Config,
    identity: Option<Identity>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        %addr,
        model_program = %config.model_program,
        model_args = ?config.model_args,
        workspace_root = %config.workspace_root.display(),
        timeout = ?config.timeout,
        max_jobs = config.max_concurrent_jobs,
        tls = identity.is_some(),
        "starting species prediction server"
    );

    let predictor = PredictorService::new(JobCoordinator::new(config));
    let mut builder = Server::builder();
    if let Some(identity) = identity {
        builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
    }

    builder
        .add_service(SpeciesNetServer::new(predictor))
        .serve(addr)
        .await?;

    Ok(())
}
