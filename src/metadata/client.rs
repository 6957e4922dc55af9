//! Cluster metadata service client

use crate::common::{JsonClient, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One container registered under a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub create_index: u64,
    #[serde(default)]
    pub primary_ip: String,
    #[serde(default)]
    pub health_state: String,
}

/// Service descriptor as published by the metadata service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scale: usize,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Service {
    /// Volume size in bytes, if the service metadata carries a `volume_size` entry
    pub fn volume_size(&self) -> Option<u64> {
        match self.metadata.get("volume_size")? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Service `name` within this container's own stack
    async fn self_service_by_name(&self, name: &str) -> Result<Service>;

    /// The container this process runs in
    async fn self_container(&self) -> Result<Container>;
}

/// HTTP client for the metadata service
pub struct HttpMetadataClient {
    client: JsonClient,
}

impl HttpMetadataClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(url, timeout)?,
        })
    }

    /// Block until the metadata service answers, retrying every `interval`
    pub async fn wait_until_reachable(&self, interval: Duration) {
        loop {
            match self.client.ping("version").await {
                Ok(_) => return,
                Err(e) => {
                    tracing::info!(
                        "Waiting for metadata service at {}: {}",
                        self.client.base_url(),
                        e
                    );
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl MetadataApi for HttpMetadataClient {
    async fn self_service_by_name(&self, name: &str) -> Result<Service> {
        self.client
            .get(&format!("self/stack/services/{}", name))
            .await
    }

    async fn self_container(&self) -> Result<Container> {
        self.client.get("self/container").await
    }
}
