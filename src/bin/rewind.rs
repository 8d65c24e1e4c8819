//! rewind CLI
//!
//! Reads all of stdin and overwrites the target file with it.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use rewind::{open_file_store, OverwriteSink, SinkConfig};

/// Command-line configuration
#[derive(Debug, PartialEq, Eq)]
struct Config {
    /// File to overwrite
    path: PathBuf,
    /// Sync the file after writing
    sync: bool,
}

/// What the command line asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Config),
    Help,
}

fn print_help() {
    println!("rewind - overwrite a file with stdin");
    println!();
    println!("USAGE:");
    println!("    rewind [OPTIONS] <PATH>");
    println!();
    println!("OPTIONS:");
    println!("    -s, --sync      Sync the file to disk after writing");
    println!("    -h, --help      Print help information");
    println!();
    println!("Logging is controlled with RUST_LOG (default: warn).");
}

/// Parses arguments, not including the program name.
fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut path = None;
    let mut sync = false;

    for arg in args {
        match arg.as_str() {
            "--sync" | "-s" => sync = true,
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            other => {
                if path.is_some() {
                    return Err(format!("unexpected argument: {other}"));
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    let path = path.ok_or_else(|| "missing <PATH>".to_string())?;
    Ok(Command::Run(Config { path, sync }))
}

fn run(config: &Config) -> Result<usize, String> {
    let mut payload = Vec::new();
    std::io::stdin()
        .read_to_end(&mut payload)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    debug!(bytes = payload.len(), "read payload from stdin");

    let file = open_file_store(&config.path)
        .map_err(|e| format!("failed to open {}: {e}", config.path.display()))?;

    let sink_config = SinkConfig::default().with_sync_on_write(config.sync);
    let mut sink = OverwriteSink::with_config(&file, sink_config);

    sink.write(&payload).map_err(|err| {
        error!(path = %config.path.display(), state = ?err.store_state(), "overwrite failed");
        format!("{err} (store state: {:?})", err.store_state())
    })
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run `rewind --help` for usage");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(written) => {
            debug!(bytes = written, path = %config.path.display(), "file overwritten");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
