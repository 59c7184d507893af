use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Connect to a gRPC species prediction server
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// The address of the server
    #[clap(
        short = 's',
        long = "server",
        env = "SPECIESNET_SERVER",
        default_value = "http://127.0.0.1:8080"
    )]
    pub server: String,
    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Subcommand)]
pub enum SubCommand {
    /// check that the server is up
    Health,
    /// classify an image file
    Predict {
        /// path to the image
        #[clap(parse(from_os_str))]
        image: PathBuf,

        #[clap(long)]
        /// MIME type of the image, guessed from the file extension when omitted
        content_type: Option<String>,
    },
}

/// Best-effort MIME type from an image's file extension.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(content_type)
}
