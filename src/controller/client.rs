//! Controller control API client

use crate::common::{encode_replica_id, JsonClient, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::time::Duration;

/// Mode the controller reports for a failed replica (compared case-insensitively)
pub const MODE_ERROR: &str = "ERR";

/// The controller's record of one attached replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerReplica {
    pub address: String,
    #[serde(default)]
    pub mode: String,
}

impl ControllerReplica {
    pub fn is_errored(&self) -> bool {
        self.mode.eq_ignore_ascii_case(MODE_ERROR)
    }
}

impl fmt::Display for ControllerReplica {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.mode)
    }
}

#[derive(Debug, Deserialize)]
struct ReplicaCollection {
    #[serde(default)]
    data: Vec<ControllerReplica>,
}

/// Membership operations on the controller's live replica set.
///
/// The controller owns that set; nothing here is atomic across calls.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Start the volume with exactly `addresses`
    async fn start(&self, addresses: &[String]) -> Result<()>;

    async fn list_replicas(&self) -> Result<Vec<ControllerReplica>>;

    async fn add_replica(&self, address: &str) -> Result<()>;

    async fn delete_replica(&self, address: &str) -> Result<()>;
}

pub struct HttpControllerClient {
    client: JsonClient,
    volume_name: String,
}

impl HttpControllerClient {
    pub fn new(url: &str, volume_name: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.trim_end_matches('/');
        let base = if url.ends_with("/v1") {
            url.to_string()
        } else {
            format!("{}/v1", url)
        };
        Ok(Self {
            client: JsonClient::new(base, timeout)?,
            volume_name: volume_name.into(),
        })
    }
}

#[async_trait]
impl ControllerApi for HttpControllerClient {
    async fn start(&self, addresses: &[String]) -> Result<()> {
        self.client
            .post(
                &format!("volumes/{}?action=start", self.volume_name),
                &json!({ "replicas": addresses }),
            )
            .await
    }

    async fn list_replicas(&self) -> Result<Vec<ControllerReplica>> {
        let collection: ReplicaCollection = self.client.get("replicas").await?;
        Ok(collection.data)
    }

    async fn add_replica(&self, address: &str) -> Result<()> {
        self.client
            .post("replicas", &json!({ "address": address }))
            .await
    }

    async fn delete_replica(&self, address: &str) -> Result<()> {
        self.client
            .delete(&format!("replicas/{}", encode_replica_id(address)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mode_case_insensitive() {
        for mode in ["ERR", "err", "Err"] {
            let r = ControllerReplica { address: "tcp://a:9502".into(), mode: mode.into() };
            assert!(r.is_errored(), "{}", mode);
        }
        let r = ControllerReplica { address: "tcp://a:9502".into(), mode: "RW".into() };
        assert!(!r.is_errored());
    }

    #[test]
    fn test_decode_replica_collection() {
        let body = r#"{"type":"collection","data":[{"address":"tcp://10.0.0.1:9502","mode":"RW"},{"address":"tcp://10.0.0.2:9502","mode":"WO"}]}"#;
        let collection: ReplicaCollection = serde_json::from_str(body).unwrap();
        assert_eq!(collection.data.len(), 2);
        assert_eq!(collection.data[1].mode, "WO");
    }
}
