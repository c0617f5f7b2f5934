//! Print the program header layout of a PIL firmware image

use anyhow::Result;
use clap::Parser;
use pil_squasher::{cli, inspect, Config};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pil-info")]
#[command(version, about = "Show how a PIL firmware image is laid out and split")]
struct Cli {
    /// Combined (.mbn) or metadata (.mdt) image
    image: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<()> {
    let report = inspect(&cli.image, &Config::default())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        report.write_text(&mut out)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match cli::parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    cli::init_logging(cli.verbose);

    cli::finish(run(&cli))
}
