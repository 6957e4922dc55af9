//! Replica side: control API client, open-state probe and the replica role

pub mod client;
pub mod probe;
pub mod server;

pub use client::{HttpReplicaClient, HttpReplicaConnector, ReplicaApi, ReplicaConnector, ReplicaInfo};
pub use probe::{wait_until_open, OPEN_TIMEOUT_MESSAGE};
pub use server::ReplicaAgent;
