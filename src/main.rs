// src/main.rs

use std::process::ExitCode;

use auctioneer::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("auctioneer: could not initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Setup failures only; a finished auction without a winner is a success.
            eprintln!("auctioneer: {err:#}");
            ExitCode::FAILURE
        }
    }
}
