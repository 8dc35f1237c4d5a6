//! Plinth
//!
//! A minimal non-reparenting X11 window manager: it redirects the root
//! window's substructure and grants every map and configure request as asked.

mod companion;
mod config;
mod error;
mod shutdown;
mod transport;
mod wm;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, SessionConfig};
use crate::error::WmError;
use crate::transport::X11Transport;
use crate::wm::WindowManager;
use crate::wm::session::Session;

/// Connect, bootstrap, and dispatch until the server goes away.
///
/// Runs on a dedicated blocking thread; it is the only place that talks to
/// the X server.
fn run_window_manager(config: SessionConfig) -> Result<(), WmError> {
    let transport = X11Transport::connect(None)?;
    let mut session = Session::new(transport);
    session.initialize(&config)?;
    if let Some(window) = session.diagnostic_window() {
        info!("Diagnostic window {}", window);
    }

    let mut wm = WindowManager::new(session);
    wm.run()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "plinth=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting plinth");

    let config = Config::load();

    // Signal listener and companions live on their own tasks and never touch
    // the connection.
    let _signals = shutdown::install()?;
    let _companions = companion::spawn(config.companions.clone());

    let dispatch = tokio::task::spawn_blocking(move || run_window_manager(config.session));

    match dispatch.await.context("Dispatch thread panicked")? {
        Ok(()) => {
            info!("Session ended");
            Ok(())
        }
        Err(e) => {
            error!("Fatal: {}", e);
            Err(e).context("Window manager session failed")
        }
    }
}
