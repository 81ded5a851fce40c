use std::process::exit;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Exit cleanly on CTRL-C. Prompts block the main thread, so this runs on a runtime worker.
pub(crate) fn spawn_ctrlc_listener() -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                println!();
                info!("Received keyboard interrupt :o");
                info!("Shutting down!");
                exit(130)
            }
            Err(e) => warn!("Failed to register CTRL-C handler: {e}"),
        }
    })
}
