use cfgmig_cli::cli::{command, DEFAULT_LOG_LEVEL};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = command().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or(DEFAULT_LOG_LEVEL, String::as_str);
    let json = matches
        .get_one::<String>("log-format")
        .is_some_and(|format| format == "json");
    if let Err(err) = cfgmig_cli::logging::init(level, json) {
        eprintln!("cfgmig: {err:#}");
        return ExitCode::FAILURE;
    }

    match cfgmig_cli::run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "cfgmig failed");
            ExitCode::FAILURE
        }
    }
}
