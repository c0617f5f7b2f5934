//! Split a combined PIL firmware image into `.mdt` and `.bNN` files

use clap::Parser;
use pil_squasher::{cli, split_with_config, Config};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pil-splitter")]
#[command(version, about = "Split a PIL firmware image into .mdt and .bNN files")]
struct Cli {
    /// Combined firmware image to read
    #[arg(value_name = "MBN_INPUT")]
    mbn: PathBuf,

    /// Metadata file to write; segment files are created next to it
    #[arg(value_name = "MDT_OUTPUT")]
    mdt: PathBuf,

    /// Keep hash segments in the .mdt only, without a .bNN copy
    #[arg(long)]
    no_hash_segment_files: bool,

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

    let config = Config::default().with_hash_segment_files(!cli.no_hash_segment_files);
    cli::finish(split_with_config(&cli.mbn, &cli.mdt, &config).map_err(Into::into))
}
