//! # volagent
//!
//! Membership agent for a replicated block volume. It runs next to either
//! the volume controller or one of its replicas:
//! - Controller role: picks the replicas the volume may start with, starts
//!   the controller, then keeps the controller's live replica set in line
//!   with the cluster metadata service, one corrective action per pass
//! - Replica role: opens the local replica and answers health probes by
//!   cross-checking the controller's replica list
//!
//! ## Architecture
//!
//! ```text
//!  ┌───────────────────┐   discover    ┌──────────────────────┐
//!  │ metadata service  │◄──────────────┤ volagent controller  │
//!  └───────────────────┘               │  startup selection   │
//!                                      │  reconciliation loop │
//!  ┌───────────────────┐  list/add/del └──────────┬───────────┘
//!  │ controller REST   │◄─────────────────────────┤ probe open
//!  └─────────▲─────────┘                ┌─────────▼───────────┐
//!            │ list (health check)      │ replica REST (xN)   │
//!  ┌─────────┴─────────┐                └─────────────────────┘
//!  │ volagent replica  │
//!  └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! volagent controller --listen 0.0.0.0:8199
//! volagent replica --log-level info
//! ```

pub mod common;
pub mod controller;
pub mod metadata;
pub mod replica;
pub mod status;

// Re-export commonly used types
pub use common::{AgentConfig, Error, Result};
pub use controller::ControllerAgent;
pub use replica::ReplicaAgent;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
