use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use keyword_debugger::{wire, DebugConfig, DebugListener, StoredVariables};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let events_path = args
        .iter()
        .position(|arg| arg == "--events")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let config = DebugConfig::from_env();
    let variables = StoredVariables::default();
    let mut listener = DebugListener::new(config, Box::new(variables.clone()));

    let result = match events_path {
        Some(path) => match File::open(&path) {
            Ok(file) => wire::run(BufReader::new(file), &mut listener, &variables),
            Err(e) => {
                error!(path = %path, error = %e, "cannot open event file");
                return ExitCode::FAILURE;
            }
        },
        None => wire::run(io::stdin().lock(), &mut listener, &variables),
    };

    if let Err(e) = result {
        error!(error = %e, "event stream ended with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
