//! Common utilities and types shared across volagent

pub mod config;
pub mod error;
pub mod http_client;
pub mod tracing_middleware;
pub mod utils;

pub use config::{AgentConfig, Timings, DEFAULT_VOLUME_SIZE};
pub use error::{Error, Result, ResultExt};
pub use http_client::JsonClient;
pub use utils::{encode_replica_id, format_bytes, parse_duration, replica_address, replica_control_url, Backoff};
