//! Companion Process Supervisor
//!
//! Launches desktop helpers (wallpaper restore, hotkey daemon) once, after a
//! delay. Nothing here can fail the window manager: every outcome is logged
//! and dropped.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{CompanionConfig, CompanionProgram};

/// How one companion run ended.
#[derive(Debug)]
pub enum CompanionOutcome {
    Exited(ExitStatus),
    Failed(ExitStatus),
    NotFound,
    SpawnFailed(io::Error),
}

/// Run a single companion to completion.
pub async fn run_companion(companion: &CompanionProgram) -> CompanionOutcome {
    let child = Command::new(&companion.program)
        .args(&companion.args)
        .stdin(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return CompanionOutcome::NotFound,
        Err(e) => return CompanionOutcome::SpawnFailed(e),
    };
    debug!("Launched companion {} (pid {:?})", companion.program, child.id());

    match child.wait().await {
        Ok(status) if status.success() => CompanionOutcome::Exited(status),
        Ok(status) => CompanionOutcome::Failed(status),
        Err(e) => CompanionOutcome::SpawnFailed(e),
    }
}

fn log_outcome(program: &str, outcome: &CompanionOutcome) {
    match outcome {
        CompanionOutcome::Exited(status) => debug!("Companion {} finished ({})", program, status),
        CompanionOutcome::Failed(status) => warn!("Companion {} exited with {}", program, status),
        CompanionOutcome::NotFound => warn!("Companion {} not found on PATH", program),
        CompanionOutcome::SpawnFailed(e) => warn!("Failed to run companion {}: {}", program, e),
    }
}

/// Spawn the delayed launcher. Each companion gets its own task so a
/// long-running daemon never holds up the next one.
pub fn spawn(config: CompanionConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        if config.programs.is_empty() {
            return;
        }
        tokio::time::sleep(config.delay()).await;

        info!("Starting {} companion program(s)", config.programs.len());
        for companion in config.programs {
            tokio::spawn(async move {
                let outcome = run_companion(&companion).await;
                log_outcome(&companion.program, &outcome);
            });
        }
    })
}
