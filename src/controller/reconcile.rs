//! Reconciliation between the controller's live replica set and metadata
//!
//! One pass at a time, with at most one removal per pass. A removal ends the
//! pass; additions only happen in a pass that removed nothing.

use crate::common::{Result, ResultExt};
use crate::controller::client::ControllerReplica;
use crate::controller::server::ControllerAgent;
use crate::metadata::{DiscoverySnapshot, ReplicaDescriptor};
use std::collections::BTreeSet;

/// What a pass decided to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    Remove(String),
    Add(Vec<ReplicaDescriptor>),
    Nothing,
}

/// What a pass actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Removed(String),
    Added(Vec<String>),
    InSync,
}

/// Decide the corrective action for one pass.
///
/// The last replica is never removed, even if metadata no longer lists it.
pub fn plan_sync(in_controller: &[ControllerReplica], desired: &DiscoverySnapshot) -> SyncPlan {
    let known: BTreeSet<&str> = in_controller.iter().map(|r| r.address.as_str()).collect();

    if in_controller.len() > 1 {
        if let Some(stale) = known.iter().find(|address| !desired.contains(address)) {
            return SyncPlan::Remove(stale.to_string());
        }
    }

    let missing: Vec<ReplicaDescriptor> = desired
        .replicas
        .iter()
        .filter(|(address, _)| !known.contains(address.as_str()))
        .map(|(_, r)| r.clone())
        .collect();

    if missing.is_empty() {
        SyncPlan::Nothing
    } else {
        SyncPlan::Add(missing)
    }
}

impl ControllerAgent {
    /// One reconciliation pass
    pub async fn sync_replicas(&self) -> Result<SyncOutcome> {
        tracing::debug!("Syncing replicas.");

        let in_controller = self
            .controller
            .list_replicas()
            .await
            .context("Error listing replicas in controller")?;

        let desired = self
            .discovery
            .discover()
            .await
            .context("Error listing replicas in metadata")?;

        match plan_sync(&in_controller, &desired) {
            SyncPlan::Remove(address) => {
                tracing::info!("Removing replica {}", address);
                self.controller
                    .delete_replica(&address)
                    .await
                    .with_context(|| format!("Error removing replica {}", address))?;
                Ok(SyncOutcome::Removed(address))
            }
            SyncPlan::Add(missing) => {
                let mut added = Vec::with_capacity(missing.len());
                for replica in &missing {
                    let address = replica.address();
                    self.attach(replica)
                        .await
                        .with_context(|| format!("Error adding replica {}", address))?;
                    added.push(address);
                }
                Ok(SyncOutcome::Added(added))
            }
            SyncPlan::Nothing => Ok(SyncOutcome::InSync),
        }
    }

    /// Wait for the replica to open, then hand it to the controller
    pub async fn attach(&self, replica: &ReplicaDescriptor) -> Result<()> {
        let address = replica.address();
        tracing::info!("Adding replica {}", address);
        self.ensure_open(&address).await?;
        self.controller.add_replica(&address).await
    }

    /// Reconcile every `sync_interval` until shutdown. Pass errors are logged, never fatal.
    pub async fn run_sync_loop(&self) {
        loop {
            match self.sync_replicas().await {
                Ok(SyncOutcome::InSync) => {}
                Ok(outcome) => tracing::info!("Sync pass finished: {:?}", outcome),
                Err(e) => tracing::error!("Failed to sync replicas: {}", e),
            }

            if !self.pause(self.timings.sync_interval).await {
                tracing::info!("Stopping replica sync loop.");
                return;
            }
        }
    }
}
