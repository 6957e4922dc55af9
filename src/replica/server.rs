//! Replica role: open the local replica and identify it to the health check

use crate::common::{format_bytes, replica_address, Result, ResultExt};
use crate::metadata::MetadataApi;
use crate::replica::client::ReplicaApi;
use std::sync::Arc;

pub struct ReplicaAgent {
    replica: Arc<dyn ReplicaApi>,
    metadata: Arc<dyn MetadataApi>,
    service_name: String,
    replica_port: u16,
    default_volume_size: u64,
}

impl ReplicaAgent {
    pub fn new(
        replica: Arc<dyn ReplicaApi>,
        metadata: Arc<dyn MetadataApi>,
        service_name: impl Into<String>,
        replica_port: u16,
        default_volume_size: u64,
    ) -> Self {
        Self {
            replica,
            metadata,
            service_name: service_name.into(),
            replica_port,
            default_volume_size,
        }
    }

    /// Size from the replica service metadata, else the configured default
    pub async fn volume_size(&self) -> Result<u64> {
        let service = self
            .metadata
            .self_service_by_name(&self.service_name)
            .await
            .context("Error reading replica service from metadata")?;
        Ok(service.volume_size().unwrap_or(self.default_volume_size))
    }

    /// Address the controller knows this replica by
    pub async fn self_address(&self) -> Result<String> {
        let me = self
            .metadata
            .self_container()
            .await
            .context("Error reading own container from metadata")?;
        Ok(replica_address(&me.primary_ip, self.replica_port))
    }

    /// Open the local replica; returns the size it was opened with
    pub async fn start(&self) -> Result<u64> {
        let size = self.volume_size().await?;
        tracing::info!("Opening replica ({}).", format_bytes(size));
        self.replica
            .open_replica(&size.to_string())
            .await
            .context("Error opening replica")?;
        Ok(size)
    }

    pub fn close(&self) {
        tracing::info!("Shutting down replica.");
    }
}
