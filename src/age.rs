use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::docker::ContainerRuntime;
use crate::error::Result;
use crate::models::{ContainerSnapshot, SkippedContainer};
use crate::parse::parse_container;

/// Whole seconds elapsed between `started_at` and `now`.
///
/// A start time in the future (clock skew between the runtime host and the
/// caller) yields zero rather than a negative age.
pub fn compute_age(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let elapsed = now.signed_duration_since(started_at);
    if elapsed <= chrono::TimeDelta::zero() {
        return 0;
    }
    // num_seconds truncates toward zero, which is floor for positive spans
    elapsed.num_seconds() as u64
}

/// Inspect every running container and turn it into a record aged against `now`.
///
/// Timeouts and malformed payloads drop only the affected container; losing
/// the runtime altogether aborts the whole snapshot.
pub async fn collect_containers(
    runtime: &dyn ContainerRuntime,
    concurrency: usize,
    tier_label: &str,
    now: DateTime<Utc>,
) -> Result<ContainerSnapshot> {
    let ids = runtime.list_running_container_ids().await?;
    debug!("Found {} running containers", ids.len());

    let mut snapshot = ContainerSnapshot::default();

    for (id, inspected) in runtime.inspect_containers(ids, concurrency).await {
        let parsed = inspected.and_then(|payload| parse_container(&id, &payload, tier_label, now));

        match parsed {
            Ok(record) => snapshot.records.push(record),
            Err(e) if e.is_recoverable() => {
                warn!("Skipping container {}: {}", id, e);
                snapshot.skipped.push(SkippedContainer { id, error: e });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(snapshot)
}
