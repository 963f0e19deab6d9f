//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Sync files between a local directory and a SharePoint document library.
///
/// With `--download_path`, every file in the library root is downloaded.
/// With `--upload_path`, every file in the directory is uploaded, replacing
/// remote files of the same name.
#[derive(Parser, Debug)]
#[command(name = "sharepoint-sync")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON config file
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Directory to download library files into
    #[arg(short = 'd', long = "download_path")]
    pub download_path: Option<PathBuf>,

    /// Directory whose files are uploaded to the library
    #[arg(short = 'u', long = "upload_path")]
    pub upload_path: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output and progress bars
    #[arg(short, long)]
    pub quiet: bool,
}
