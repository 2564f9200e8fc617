//! # palaver
//!
//! Line-oriented front end for the Palaver messenger store.
//!
//! Each stdin line is one command (`register`, `login`, `send`, `group-create`,
//! `like`, ...). Each result is printed to stdout as a single JSON object,
//! either `{"ok": ...}` or `{"error": ...}`. Logs go to stderr.

mod commands;
mod dto;
mod error;

use std::io;

use tracing::info;
use tracing_subscriber::EnvFilter;

use palaver_store::{Messenger, StoreConfig};

fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,palaver_store=debug")),
        )
        .init();

    info!("Starting Palaver v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration and open the store
    // -----------------------------------------------------------------------
    let config = StoreConfig::from_env();
    info!(?config, "Loaded configuration");

    let mut messenger = Messenger::open(&config)?;

    // -----------------------------------------------------------------------
    // 3. Command loop
    // -----------------------------------------------------------------------
    let stdin = io::stdin();
    let stdout = io::stdout();
    commands::run(&mut messenger, stdin.lock(), stdout.lock(), config.recent_limit)?;

    if let Err(e) = messenger.flush() {
        tracing::error!(error = %e, "final flush failed");
    }
    info!("Palaver stopped");
    Ok(())
}
