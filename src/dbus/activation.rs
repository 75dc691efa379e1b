use std::time::Duration;

use super::bus::{BusError, ServiceBus};
use crate::config::RetryPolicy;

/// Activate `name`, retrying while the bus does not know the service yet.
///
/// The bus daemon picks up new service files asynchronously, so right after
/// installing a descriptor activation can fail with `ServiceUnknown`. That
/// error is retried up to `policy.attempts` times in total, calling `sleep`
/// between attempts; any other error is returned immediately. Returns the
/// number of attempts used.
pub fn activate_with_retry<B, F>(
    bus: &B,
    name: &str,
    policy: &RetryPolicy,
    mut sleep: F,
) -> Result<u32, BusError>
where
    B: ServiceBus + ?Sized,
    F: FnMut(Duration),
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match bus.start_service_by_name(name) {
            Ok(()) => return Ok(attempt),
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::debug!(
                    "Activation attempt {}/{} failed: {}",
                    attempt,
                    attempts,
                    err
                );
                sleep(policy.delay());
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
