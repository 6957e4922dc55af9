//! Wait for a replica to report the open state

use crate::common::{Backoff, Result};
use crate::replica::client::ReplicaApi;
use std::time::Duration;

pub const OPEN_TIMEOUT_MESSAGE: &str = "Timed out waiting for replica to open.";

/// Poll `replica` with the open backoff until it is open or `max_wait` elapses.
///
/// Unreachable and not-yet-open are retried alike; an unexpected response
/// fails right away.
pub async fn wait_until_open(
    replica: &dyn ReplicaApi,
    max_wait: Duration,
    timeout_message: &str,
) -> Result<()> {
    Backoff::replica_open(max_wait)
        .poll_until(timeout_message, move || async move {
            let info = replica.get_replica().await?;
            Ok::<_, crate::Error>(info.is_open())
        })
        .await
}
