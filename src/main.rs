mod backend;
mod cli;
mod files;
mod gdrive;
mod input;
mod itunes;
mod metadata;
mod models;
mod process;
mod setup;
mod signals;
mod tagging;
mod terminal;
mod user;
mod video;
mod workflow;
mod youtube;

use crate::backend::LiveBackend;
use crate::cli::{CliArgs, Parser};
use crate::terminal::Terminal;
use tracing::{error, info};

fn init_logging(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("songbird={log_level}"))),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = args.config;
    init_logging(&config.log_level);

    setup::name_plate();
    // outside a container the folders are ours to create, inside they come from bind mounts
    if config.run_local {
        if let Err(e) = setup::initialize_dirs(&setup::dirs(&config)) {
            error!("Could not create the app folders: {e}");
            return;
        }
    }
    if !setup::validate_essentials(&config) {
        return;
    }

    signals::spawn_ctrlc_listener();

    let backend = LiveBackend::new(config.clone());
    let mut terminal = Terminal::new();
    if let Err(e) = workflow::run(&config, &backend, &mut terminal).await {
        error!("Stopped reading input: {e}");
    }

    info!("Shutting down!");
}
