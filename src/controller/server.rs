//! Controller role: startup selection followed by the reconciliation loop

use crate::common::{Result, ResultExt, Timings};
use crate::controller::client::ControllerApi;
use crate::metadata::Discovery;
use crate::replica::{wait_until_open, ReplicaConnector, OPEN_TIMEOUT_MESSAGE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub struct ControllerAgent {
    pub(crate) controller: Arc<dyn ControllerApi>,
    pub(crate) discovery: Discovery,
    pub(crate) connector: Arc<dyn ReplicaConnector>,
    pub(crate) timings: Timings,
    shutdown: Arc<Notify>,
}

impl ControllerAgent {
    pub fn new(
        controller: Arc<dyn ControllerApi>,
        discovery: Discovery,
        connector: Arc<dyn ReplicaConnector>,
        timings: Timings,
    ) -> Self {
        Self {
            controller,
            discovery,
            connector,
            timings,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Notify once to stop at the next pause between passes
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Block until the controller runs with an admissible replica set, then
    /// reconcile until shutdown.
    pub async fn start(&self) -> Result<()> {
        tracing::info!("Starting volume. Getting replicas to start with.");
        let addresses = self.select_startup_set().await?;

        tracing::info!("Starting controller with replicas: {:?}.", addresses);
        self.controller
            .start(&addresses)
            .await
            .context("Error starting controller")?;

        self.run_sync_loop().await;
        Ok(())
    }

    pub fn close(&self) {
        tracing::info!("Shutting down volume agent.");
    }

    /// Wait for `address` to report open within the configured budget
    pub(crate) async fn ensure_open(&self, address: &str) -> Result<()> {
        let replica = self.connector.connect(address)?;
        wait_until_open(replica.as_ref(), self.timings.open_timeout, OPEN_TIMEOUT_MESSAGE).await
    }

    /// Sleep for `duration`; false if shutdown was requested meanwhile
    pub(crate) async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.shutdown.notified() => false,
        }
    }
}
