//! Replica control API client

use crate::common::{replica_control_url, JsonClient, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const STATE_OPEN: &str = "open";
pub const STATE_DIRTY: &str = "dirty";

/// Replica lifecycle as reported by the replica itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaInfo {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub dirty: bool,
}

impl ReplicaInfo {
    pub fn is_open(&self) -> bool {
        self.state == STATE_OPEN
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.state == STATE_DIRTY
    }
}

#[async_trait]
pub trait ReplicaApi: Send + Sync {
    async fn get_replica(&self) -> Result<ReplicaInfo>;

    /// Open the replica with a size in bytes (decimal string)
    async fn open_replica(&self, size: &str) -> Result<()>;
}

/// Builds a control client for a replica address
pub trait ReplicaConnector: Send + Sync {
    fn connect(&self, address: &str) -> Result<Arc<dyn ReplicaApi>>;
}

pub struct HttpReplicaClient {
    client: JsonClient,
}

impl HttpReplicaClient {
    /// `address` may be a replica address (`tcp://h:p`) or a control URL
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(replica_control_url(address)?, timeout)?,
        })
    }
}

#[async_trait]
impl ReplicaApi for HttpReplicaClient {
    async fn get_replica(&self) -> Result<ReplicaInfo> {
        self.client.get("replicas/1").await
    }

    async fn open_replica(&self, size: &str) -> Result<()> {
        self.client
            .post("replicas/1?action=open", &json!({ "size": size }))
            .await
    }
}

pub struct HttpReplicaConnector {
    timeout: Duration,
}

impl HttpReplicaConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ReplicaConnector for HttpReplicaConnector {
    fn connect(&self, address: &str) -> Result<Arc<dyn ReplicaApi>> {
        Ok(Arc::new(HttpReplicaClient::new(address, self.timeout)?))
    }
}
