//! Health probes backed by the controller's authoritative replica list

pub mod health;
pub mod http;

pub use health::{controller_health, status_in_controller, Health, ReplicaHealthCheck};
pub use http::{create_router, serve, StatusState};
