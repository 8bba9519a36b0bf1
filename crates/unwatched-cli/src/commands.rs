use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "unwatched")]
#[command(about = "Find media nobody watched and clean it up", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactively collect unwatched media, review it and delete or offload it
    Review(ReviewArgs),
    /// List library sections known to Tautulli
    Libraries,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Default, clap::Args)]
pub struct ReviewArgs {
    /// Write the candidate list to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Zip the candidates into `<archive_path>/archived_media.zip` before deleting or offloading
    #[arg(long)]
    pub archive: bool,

    /// Move candidates to the configured bucket under this directory instead of deleting
    #[arg(long, value_name = "REMOTE_DIR")]
    pub offload: Option<String>,
}
