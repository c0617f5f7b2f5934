//! Shared plumbing for the command line tools

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parse the command line, printing usage and mapping failures to status 1
pub fn parse_args<C: Parser>() -> std::result::Result<C, ExitCode> {
    C::try_parse().map_err(|err| {
        let _ = err.print();
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
            _ => ExitCode::from(1),
        }
    })
}

/// Install a stderr logger; verbosity 0 only shows warnings
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    // Already installed when called twice in one process
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Print the error chain, if any, on one line and turn the outcome into an
/// exit status
pub fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
