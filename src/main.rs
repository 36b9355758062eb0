use std::process::ExitCode;

use breagle_lift_lib::commands::{self, Cli};
use breagle_lift_lib::logging;
use clap::Parser;
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match commands::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
