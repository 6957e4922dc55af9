//! Controller side of the agent
//!
//! The controller is responsible for:
//! - Choosing the replicas a volume starts with
//! - Keeping its live replica set in line with the metadata service
//! - Attaching newly registered replicas once they report open

pub mod client;
pub mod reconcile;
pub mod server;
pub mod startup;

pub use client::{ControllerApi, ControllerReplica, HttpControllerClient, MODE_ERROR};
pub use reconcile::{plan_sync, SyncOutcome, SyncPlan};
pub use server::ControllerAgent;
pub use startup::admissible_candidates;
