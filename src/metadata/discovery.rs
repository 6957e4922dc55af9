//! Replica discovery from the metadata service
//!
//! Each call rebuilds the view from scratch: containers are deduplicated by
//! logical name (highest `create_index` wins) and keyed by replica address.

use crate::common::{replica_address, Result};
use crate::metadata::client::{Container, MetadataApi};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One replica instance as seen by the metadata service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaDescriptor {
    pub host: String,
    pub port: u16,
    pub health_state: String,
}

impl ReplicaDescriptor {
    pub fn address(&self) -> String {
        replica_address(&self.host, self.port)
    }
}

/// Result of one discovery call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverySnapshot {
    /// Declared replica count of the service
    pub scale: usize,
    pub replicas: BTreeMap<String, ReplicaDescriptor>,
}

impl DiscoverySnapshot {
    pub fn addresses(&self) -> impl Iterator<Item = &String> {
        self.replicas.keys()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.replicas.contains_key(address)
    }
}

impl fmt::Display for DiscoverySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .replicas
            .iter()
            .map(|(address, r)| format!("{} ({})", address, r.health_state))
            .collect();
        write!(f, "[{}]", entries.join(", "))
    }
}

#[derive(Clone)]
pub struct Discovery {
    metadata: Arc<dyn MetadataApi>,
    service_name: String,
    replica_port: u16,
}

impl Discovery {
    pub fn new(metadata: Arc<dyn MetadataApi>, service_name: impl Into<String>, replica_port: u16) -> Self {
        Self {
            metadata,
            service_name: service_name.into(),
            replica_port,
        }
    }

    /// Fetch the replica service and build the address-keyed replica set.
    ///
    /// Metadata errors are returned unchanged; callers own the retry policy.
    pub async fn discover(&self) -> Result<DiscoverySnapshot> {
        let service = self.metadata.self_service_by_name(&self.service_name).await?;

        let replicas = latest_by_name(service.containers)
            .into_values()
            .map(|c| {
                let descriptor = ReplicaDescriptor {
                    host: c.primary_ip,
                    port: self.replica_port,
                    health_state: c.health_state,
                };
                (descriptor.address(), descriptor)
            })
            .collect();

        Ok(DiscoverySnapshot {
            scale: service.scale,
            replicas,
        })
    }
}

/// Keep only the newest container per logical name
fn latest_by_name(containers: Vec<Container>) -> HashMap<String, Container> {
    let mut latest: HashMap<String, Container> = HashMap::new();
    for container in containers {
        match latest.get(&container.name) {
            Some(existing) if existing.create_index >= container.create_index => {}
            _ => {
                latest.insert(container.name.clone(), container);
            }
        }
    }
    latest
}
