//! In-memory stand-ins for the metadata service, the controller and replicas
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use volagent::common::Timings;
use volagent::controller::{ControllerAgent, ControllerApi, ControllerReplica};
use volagent::metadata::{Container, Discovery, MetadataApi, Service};
use volagent::replica::{ReplicaApi, ReplicaConnector, ReplicaInfo};
use volagent::{Error, Result};

pub const REPLICA_PORT: u16 = 9502;

pub fn addr(ip: &str) -> String {
    format!("tcp://{}:{}", ip, REPLICA_PORT)
}

pub fn container(name: &str, create_index: u64, ip: &str) -> Container {
    Container {
        name: name.to_string(),
        create_index,
        primary_ip: ip.to_string(),
        health_state: "healthy".to_string(),
    }
}

/// One container per ip, named after it
pub fn containers(ips: &[&str]) -> Vec<Container> {
    ips.iter().map(|ip| container(&format!("replica-{}", ip), 1, ip)).collect()
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

pub struct FakeMetadata {
    service: Mutex<Service>,
    me: Mutex<Container>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeMetadata {
    pub fn new(scale: usize, containers: Vec<Container>) -> Self {
        Self {
            service: Mutex::new(Service {
                name: "replica".to_string(),
                scale,
                containers,
                metadata: HashMap::new(),
            }),
            me: Mutex::new(container("me", 1, "10.0.0.100")),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_containers(&self, containers: Vec<Container>) {
        self.service.lock().unwrap().containers = containers;
    }

    pub fn set_service_metadata(&self, key: &str, value: serde_json::Value) {
        self.service.lock().unwrap().metadata.insert(key.to_string(), value);
    }

    pub fn set_self(&self, me: Container) {
        *self.me.lock().unwrap() = me;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataApi for FakeMetadata {
    async fn self_service_by_name(&self, name: &str) -> Result<Service> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::ConnectionFailed("metadata unreachable".into()));
        }
        let service = self.service.lock().unwrap().clone();
        if service.name != name {
            return Err(Error::Http(format!("404 Not Found: service {}", name)));
        }
        Ok(service)
    }

    async fn self_container(&self) -> Result<Container> {
        Ok(self.me.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeController {
    replicas: Mutex<Vec<ControllerReplica>>,
    started: Mutex<Option<Vec<String>>>,
    added: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    failing_list: AtomicBool,
    rejecting_add: AtomicBool,
}

impl FakeController {
    pub fn with_replicas(addresses: &[String]) -> Self {
        let controller = Self::default();
        controller.set_replicas(addresses, "RW");
        controller
    }

    pub fn set_replicas(&self, addresses: &[String], mode: &str) {
        *self.replicas.lock().unwrap() = addresses
            .iter()
            .map(|a| ControllerReplica {
                address: a.clone(),
                mode: mode.to_string(),
            })
            .collect();
    }

    pub fn set_failing_list(&self, failing: bool) {
        self.failing_list.store(failing, Ordering::SeqCst);
    }

    pub fn set_rejecting_add(&self, rejecting: bool) {
        self.rejecting_add.store(rejecting, Ordering::SeqCst);
    }

    pub fn started(&self) -> Option<Vec<String>> {
        self.started.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .replicas
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.address.clone())
            .collect();
        addresses.sort();
        addresses
    }
}

#[async_trait]
impl ControllerApi for FakeController {
    async fn start(&self, addresses: &[String]) -> Result<()> {
        *self.started.lock().unwrap() = Some(addresses.to_vec());
        self.set_replicas(addresses, "RW");
        Ok(())
    }

    async fn list_replicas(&self) -> Result<Vec<ControllerReplica>> {
        if self.failing_list.load(Ordering::SeqCst) {
            return Err(Error::ConnectionFailed("controller unreachable".into()));
        }
        Ok(self.replicas.lock().unwrap().clone())
    }

    async fn add_replica(&self, address: &str) -> Result<()> {
        if self.rejecting_add.load(Ordering::SeqCst) {
            return Err(Error::Http("500 Internal Server Error".into()));
        }
        self.added.lock().unwrap().push(address.to_string());
        self.replicas.lock().unwrap().push(ControllerReplica {
            address: address.to_string(),
            mode: "WO".to_string(),
        });
        Ok(())
    }

    async fn delete_replica(&self, address: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(address.to_string());
        self.replicas.lock().unwrap().retain(|r| r.address != address);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Replicas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Behavior {
    Reports(ReplicaInfo),
    Unreachable,
    Garbage,
}

pub struct FakeReplica {
    behavior: Mutex<Behavior>,
    opened_with: Mutex<Option<String>>,
    polls: AtomicUsize,
}

impl FakeReplica {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            opened_with: Mutex::new(None),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn open() -> Self {
        Self::new(Behavior::Reports(info("open", false)))
    }

    pub fn set(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn opened_with(&self) -> Option<String> {
        self.opened_with.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

pub fn info(state: &str, dirty: bool) -> ReplicaInfo {
    ReplicaInfo {
        state: state.to_string(),
        dirty,
    }
}

#[async_trait]
impl ReplicaApi for FakeReplica {
    async fn get_replica(&self) -> Result<ReplicaInfo> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.behavior.lock().unwrap().clone() {
            Behavior::Reports(info) => Ok(info),
            Behavior::Unreachable => Err(Error::ConnectionFailed("connection refused".into())),
            Behavior::Garbage => Err(Error::InvalidResponse("expected value at line 1".into())),
        }
    }

    async fn open_replica(&self, size: &str) -> Result<()> {
        *self.opened_with.lock().unwrap() = Some(size.to_string());
        self.set(Behavior::Reports(info("open", false)));
        Ok(())
    }
}

/// Connector over a fixed set of fake replicas; unknown addresses are unreachable
#[derive(Default)]
pub struct FakeReplicas {
    replicas: Mutex<HashMap<String, Arc<FakeReplica>>>,
}

impl FakeReplicas {
    pub fn insert(&self, address: &str, replica: FakeReplica) -> Arc<FakeReplica> {
        let replica = Arc::new(replica);
        self.replicas
            .lock()
            .unwrap()
            .insert(address.to_string(), replica.clone());
        replica
    }

    pub fn get(&self, address: &str) -> Arc<FakeReplica> {
        self.replicas.lock().unwrap()[address].clone()
    }
}

impl ReplicaConnector for FakeReplicas {
    fn connect(&self, address: &str) -> Result<Arc<dyn ReplicaApi>> {
        if !address.starts_with("tcp://") {
            return Err(Error::InvalidAddress(address.to_string()));
        }
        let replica: Arc<dyn ReplicaApi> = self
            .replicas
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_insert_with(|| Arc::new(FakeReplica::new(Behavior::Unreachable)))
            .clone();
        Ok(replica)
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub metadata: Arc<FakeMetadata>,
    pub controller: Arc<FakeController>,
    pub replicas: Arc<FakeReplicas>,
    pub agent: ControllerAgent,
}

impl Harness {
    pub fn new(metadata: FakeMetadata, controller: FakeController) -> Self {
        let metadata = Arc::new(metadata);
        let controller = Arc::new(controller);
        let replicas = Arc::new(FakeReplicas::default());
        let agent = ControllerAgent::new(
            controller.clone(),
            Discovery::new(metadata.clone(), "replica", REPLICA_PORT),
            replicas.clone(),
            Timings::default(),
        );
        Self {
            metadata,
            controller,
            replicas,
            agent,
        }
    }
}
