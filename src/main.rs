//! Prefect provider driver - main entry point

use clap::Parser;
use log::{debug, info};

use prefect_provider::{run_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting terraform-provider-prefect v{}", env!("CARGO_PKG_VERSION"));
    debug!("CLI args: command={:?}, output={}", cli.command, cli.output);

    match run_command(&cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
