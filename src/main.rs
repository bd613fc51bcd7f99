use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;

use atrium::cli::Cli;
use atrium::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Failures a view already reported through the notifier are not repeated.
            if !e.is_reported() {
                eprintln!("{} {}", "error:".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}
