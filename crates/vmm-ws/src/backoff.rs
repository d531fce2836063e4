//! Reconnection backoff.

use std::time::Duration;

/// Exponential backoff: `base * 2^(attempt-1)`, capped at `max`.
///
/// attempt=1 -> base, attempt=2 -> 2*base, attempt=3 -> 4*base.
pub fn backoff_delay_ms(base_ms: u64, max_ms: u64, attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1).min(10);
    base_ms.saturating_mul(1u64 << exponent).min(max_ms)
}

/// Backoff delay plus jitter (0-1000ms).
pub fn backoff_with_jitter(base_ms: u64, max_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(backoff_delay_ms(base_ms, max_ms, attempt) + rand_jitter())
}

/// Generate random jitter (0-1000ms).
fn rand_jitter() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as u64
}
