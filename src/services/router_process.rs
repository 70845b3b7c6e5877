//! Router subprocess guard.
//!
//! When the deployment runs the transaction router as a child process
//! (e.g. `node transaction-router/`), the orchestrator spawns it
//! for the duration of one run and it is torn down when the guard drops,
//! whatever the run's outcome.

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::error::{Result, TransactorError};

pub struct RouterProcess {
    child: Child,
    command: String,
}

impl RouterProcess {
    /// Spawn the router from a whitespace-separated command line.
    pub fn spawn(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            TransactorError::Other(anyhow::anyhow!("router command is empty"))
        })?;

        let child = Command::new(program)
            .args(parts)
            .kill_on_drop(true)
            .spawn()?;

        info!(command = command_line, pid = child.id(), "Spawned transaction router");
        Ok(Self {
            child,
            command: command_line.to_string(),
        })
    }

    /// Tear the router down explicitly (drop does the same, without logging
    /// the outcome).
    pub async fn shutdown(mut self) {
        match self.child.kill().await {
            Ok(()) => info!(command = %self.command, "Transaction router stopped"),
            Err(e) => warn!(command = %self.command, "Error killing transaction router: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_rejects_an_empty_command() {
        assert!(RouterProcess::spawn("   ").is_err());
    }

    #[tokio::test]
    async fn spawned_process_is_killed_on_shutdown() {
        let router = RouterProcess::spawn("sleep 30").unwrap();
        router.shutdown().await;
    }
}
