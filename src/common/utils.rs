//! Utility functions for volagent

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::future::Future;
use std::time::Duration;

/// Canonical replica address, used as the key for every set operation
pub fn replica_address(host: &str, port: u16) -> String {
    format!("tcp://{}:{}", host, port)
}

/// Control API base URL for a replica address (`tcp://h:p` -> `http://h:p/v1`)
pub fn replica_control_url(address: &str) -> crate::Result<String> {
    let host_port = address
        .strip_prefix("tcp://")
        .or_else(|| address.strip_prefix("http://"))
        .unwrap_or(address)
        .trim_end_matches('/')
        .trim_end_matches("/v1");

    match host_port.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            Ok(format!("http://{}/v1", host_port))
        }
        _ => Err(crate::Error::InvalidAddress(address.to_string())),
    }
}

/// Controller-side id of a replica (standard base64 of its address)
pub fn encode_replica_id(address: &str) -> String {
    STANDARD.encode(address.as_bytes())
}

/// Volume size for log lines, in binary units (`10.00 GiB`)
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Timing knob from the config file: `<n>ms`, `<n>s`, `<n>m` or `<n>h`
pub fn parse_duration(s: &str) -> crate::Result<Duration> {
    let invalid = || crate::Error::InvalidConfig(format!("invalid duration: {:?}", s));

    let value = s.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = value.split_at(split);
    let n: u64 = digits.parse().map_err(|_| invalid())?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(n)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return Err(invalid()),
    };
    n.checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

/// Exponential backoff bounded by a total deadline.
///
/// Every blocking wait in the agent goes through this type so the timing
/// can be exercised on tokio's paused clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub multiplier: u32,
    pub max_interval: Duration,
    pub max_elapsed: Duration,
}

impl Backoff {
    /// 150ms doubling up to 2s between attempts, giving up after `max_elapsed`.
    pub fn replica_open(max_elapsed: Duration) -> Self {
        Self {
            initial: Duration::from_millis(150),
            multiplier: 2,
            max_interval: Duration::from_secs(2),
            max_elapsed,
        }
    }

    /// Successive sleeps between attempts. Infinite; the deadline is enforced by `poll_until`.
    pub fn intervals(&self) -> impl Iterator<Item = Duration> {
        let max = self.max_interval;
        let multiplier = self.multiplier;
        std::iter::successors(Some(self.initial.min(max)), move |wait| {
            Some(wait.saturating_mul(multiplier).min(max))
        })
    }

    /// Poll `f` until it reports done.
    ///
    /// Transient errors count as "not done yet". Once `max_elapsed` has passed
    /// since the first attempt the wait fails with `Error::Timeout(timeout_message)`.
    /// Any other error is returned immediately.
    pub async fn poll_until<F, Fut>(&self, timeout_message: &str, mut f: F) -> crate::Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::Result<bool>>,
    {
        let start = tokio::time::Instant::now();
        let mut intervals = self.intervals();

        loop {
            if start.elapsed() > self.max_elapsed {
                return Err(crate::Error::Timeout(timeout_message.to_string()));
            }

            match f().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) if e.is_transient() => {
                    tracing::debug!("Poll attempt failed, retrying: {}", e);
                }
                Err(e) => return Err(e),
            }

            let wait = intervals.next().unwrap_or(self.max_interval);
            tokio::time::sleep(wait).await;
        }
    }
}
