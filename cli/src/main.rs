mod arg_parser;
mod client_cli;

use arg_parser::{ArgParser, SubCommand};
use client_cli::ClientCli;

use clap::Parser;
use std::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ArgParser::parse();
    let mut client = ClientCli::connect(&args.server).await?;

    match args.sub_command {
        SubCommand::Health => client.health().await?,
        SubCommand::Predict {
            image,
            content_type,
        } => client.predict(&image, content_type).await?,
    }

    Ok(())
}
