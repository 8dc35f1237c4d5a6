//! Shutdown Coordinator
//!
//! SIGINT/SIGTERM end the process immediately with status 0. The dispatch
//! thread may be parked inside a blocking receive, so nothing is handed back
//! to it: the listener exits the process itself and no further request is sent.

use std::fmt;

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Termination request from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for PendingSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Terminated,
}

/// `Running -> ShuttingDown -> Terminated`, never backwards.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state: ShutdownState,
}

impl ShutdownCoordinator {
    pub const EXIT_SUCCESS: i32 = 0;

    pub fn new() -> Self {
        Self {
            state: ShutdownState::Running,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Consume a signal. Only the first one moves the state machine; returns
    /// whether it did.
    pub fn begin(&mut self, signal: PendingSignal) -> bool {
        if self.state != ShutdownState::Running {
            warn!("Ignoring {}, shutdown already in progress", signal);
            return false;
        }
        info!("Received {}, shutting down", signal);
        self.state = ShutdownState::ShuttingDown;
        true
    }

    /// Final transition; returns the process exit status.
    pub fn finish(&mut self) -> i32 {
        self.state = ShutdownState::Terminated;
        Self::EXIT_SUCCESS
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the first signal and hand the exit status to `exit`.
pub async fn run_until_signal<S, E>(next_signal: S, exit: E) -> ShutdownCoordinator
where
    S: Future<Output = PendingSignal>,
    E: FnOnce(i32),
{
    let mut coordinator = ShutdownCoordinator::new();
    let signal = next_signal.await;
    if coordinator.begin(signal) {
        exit(coordinator.finish());
    }
    coordinator
}

/// Install SIGINT/SIGTERM handlers and spawn the listener task.
///
/// The listener ends the process with `std::process::exit`, which takes the
/// dispatch thread down with it. That exit is the only thing that stops
/// dispatch after a signal: no event is handled and no request is sent once
/// it runs.
pub fn install() -> Result<JoinHandle<()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    Ok(tokio::spawn(async move {
        let next_signal = async {
            tokio::select! {
                _ = sigterm.recv() => PendingSignal::Terminate,
                _ = sigint.recv() => PendingSignal::Interrupt,
            }
        };
        run_until_signal(next_signal, |code| std::process::exit(code)).await;
    }))
}
