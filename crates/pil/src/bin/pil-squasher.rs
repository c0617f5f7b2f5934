//! Rebuild a combined PIL firmware image from `.mdt` and `.bNN` files

use clap::Parser;
use pil_squasher::{cli, squash};
use std::path::PathBuf;
use std::process::ExitCode;

// Output comes first, matching the historical tool
#[derive(Parser)]
#[command(name = "pil-squasher")]
#[command(version, about = "Squash .mdt and .bNN files into a PIL firmware image")]
struct Cli {
    /// Combined firmware image to write
    #[arg(value_name = "MBN_OUTPUT")]
    mbn: PathBuf,

    /// Metadata file to read; segment files are looked up next to it
    #[arg(value_name = "MDT_INPUT")]
    mdt: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match cli::parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    cli::init_logging(cli.verbose);

    cli::finish(squash(&cli.mdt, &cli.mbn).map_err(Into::into))
}
