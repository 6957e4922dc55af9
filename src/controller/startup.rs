//! Startup quorum selection
//!
//! Runs once at controller boot: wait until the metadata service lists at
//! least `scale` replicas, classify each one by asking it directly, and keep
//! every clean replica. With no clean replica, exactly one dirty replica is
//! used, since several dirty copies may disagree with each other.

use crate::common::{Error, Result, ResultExt};
use crate::controller::server::ControllerAgent;
use crate::metadata::DiscoverySnapshot;
use crate::replica::ReplicaInfo;

impl ControllerAgent {
    /// Discover until enough replicas have registered. Unbounded.
    pub async fn wait_for_replicas(&self) -> Result<DiscoverySnapshot> {
        loop {
            let snapshot = self
                .discovery
                .discover()
                .await
                .context("Error listing replicas in metadata")?;

            if snapshot.replicas.len() >= snapshot.scale {
                return Ok(snapshot);
            }

            tracing::info!(
                "Waiting for replicas. Current {}, expected: {}",
                snapshot.replicas.len(),
                snapshot.scale
            );
            if !self.pause(self.timings.startup_poll_interval).await {
                return Err(Error::Shutdown);
            }
        }
    }

    /// Addresses the controller may safely start with
    pub async fn select_startup_set(&self) -> Result<Vec<String>> {
        let snapshot = self.wait_for_replicas().await?;

        let mut clean = Vec::new();
        let mut dirty = Vec::new();
        for address in snapshot.addresses() {
            match self.replica_info(address).await {
                Ok(info) if info.is_dirty() => {
                    tracing::info!("Removing dirty replica {} from startup.", address);
                    dirty.push(address.clone());
                }
                Ok(_) => clean.push(address.clone()),
                Err(e) => {
                    tracing::error!(
                        "Error getting replica {}. Removing from list of startup replicas. Error: {}",
                        address,
                        e
                    );
                }
            }
        }

        let mut addresses = Vec::new();
        for address in admissible_candidates(clean, dirty) {
            if let Err(e) = self.ensure_open(&address).await {
                tracing::error!(
                    "Replica {} is not open. Removing it from startup list. Error while waiting for open: {}",
                    address,
                    e
                );
                continue;
            }
            addresses.push(address);
        }

        if addresses.is_empty() {
            return Err(Error::NoAdmissibleReplicas(snapshot.to_string()));
        }
        Ok(addresses)
    }

    async fn replica_info(&self, address: &str) -> Result<ReplicaInfo> {
        let replica = self.connector.connect(address)?;
        replica.get_replica().await
    }
}

/// All clean replicas, or else the single smallest dirty one
pub fn admissible_candidates(mut clean: Vec<String>, dirty: Vec<String>) -> Vec<String> {
    if !clean.is_empty() {
        clean.sort();
        return clean;
    }

    match dirty.into_iter().min() {
        Some(address) => {
            tracing::info!("Couldn't find any clean replicas. Using dirty replica {}.", address);
            vec![address]
        }
        None => Vec::new(),
    }
}
