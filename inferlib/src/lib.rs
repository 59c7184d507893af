mod config;
mod coordinator;
pub mod errors;
pub mod events;
pub mod invoker;
pub mod reader;
pub mod types;
pub mod workspace;

pub use config::Config;
pub use coordinator::{asset_name, JobCoordinator};
pub use errors::JobError;
pub use events::{ExitStatus, ProcessOutcome};
