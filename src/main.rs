use clap::Parser;
use shelve::cli::{Args, run_cli};
use shelve::logging::init_logging;
use shelve::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.log_file.as_deref()) {
        OutputFormatter::error(&format!("Error: {:#}", anyhow::Error::new(e)));
        return ExitCode::FAILURE;
    }

    match run_cli(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let err = anyhow::Error::new(e).context("Nothing was organized");
            tracing::error!("{:#}", err);
            OutputFormatter::error(&format!("Error: {:#}", err));
            ExitCode::FAILURE
        }
    }
}
