//! Binary health answers for the status probes

use crate::controller::{ControllerApi, ControllerReplica};
use crate::replica::ReplicaApi;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unhealthy(String),
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Health::Healthy)
    }
}

/// Liveness only: answering at all is enough for the controller.
pub fn controller_health() -> Health {
    Health::Healthy
}

/// Cross-check of one replica against the controller's live set
pub struct ReplicaHealthCheck {
    replica: Arc<dyn ReplicaApi>,
    controller: Arc<dyn ControllerApi>,
    address: String,
}

impl ReplicaHealthCheck {
    pub fn new(
        replica: Arc<dyn ReplicaApi>,
        controller: Arc<dyn ControllerApi>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            replica,
            controller,
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn check(&self) -> Health {
        // The replica side only has to answer
        if let Err(e) = self.replica.get_replica().await {
            return Health::Unhealthy(e.to_string());
        }

        // TODO: answer from the last good controller list when the controller is unreachable
        let replicas = match self.controller.list_replicas().await {
            Ok(replicas) => replicas,
            Err(e) => {
                return Health::Unhealthy(format!(
                    "Couldn't get replicas from controller. Error: {}",
                    e
                ))
            }
        };

        status_in_controller(&self.address, &replicas)
    }
}

/// Health of `address` according to the controller's replica list
pub fn status_in_controller(address: &str, replicas: &[ControllerReplica]) -> Health {
    match replicas.iter().find(|r| r.address == address) {
        Some(r) if r.is_errored() => {
            Health::Unhealthy(format!("Replica {} is in error mode.", address))
        }
        Some(_) => Health::Healthy,
        None => {
            let current: Vec<String> = replicas.iter().map(|r| r.to_string()).collect();
            Health::Unhealthy(format!(
                "Replica {} is not in the controller's list of replicas. Current list: [{}]",
                address,
                current.join(", ")
            ))
        }
    }
}
