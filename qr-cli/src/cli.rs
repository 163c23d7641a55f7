use std::path::PathBuf;

use crate::commands::Commands;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "qr-cli")]
#[clap(about = "Manage the profiles behind a QR code", long_about = None)]
pub struct Cli {
    #[clap(
        long,
        short,
        global = true,
        value_parser,
        help = "Path to the JSON config file"
    )]
    pub config: Option<PathBuf>,

    #[clap(
        long,
        short,
        global = true,
        help = "Owner whose profiles are managed"
    )]
    pub owner: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}
