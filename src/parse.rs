use bollard::models::ContainerInspectResponse;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::age::compute_age;
use crate::error::{Result, RuntimeError};
use crate::models::{ContainerRecord, NO_TIER};

/// Build a record from one inspection payload, aged against `now`.
pub fn parse_container(
    id: &str,
    payload: &ContainerInspectResponse,
    tier_label: &str,
    now: DateTime<Utc>,
) -> Result<ContainerRecord> {
    let subject = format!("container {}", id);

    let name = payload
        .name
        .as_deref()
        .ok_or_else(|| RuntimeError::parse(&subject, "missing Name"))?;
    let name = name.strip_prefix('/').unwrap_or(name).to_string();

    let config = payload
        .config
        .as_ref()
        .ok_or_else(|| RuntimeError::parse(&subject, "missing Config"))?;

    let image_ref = config
        .image
        .clone()
        .ok_or_else(|| RuntimeError::parse(&subject, "missing Config.Image"))?;

    let tier = config
        .labels
        .as_ref()
        .and_then(|labels| labels.get(tier_label))
        .cloned()
        .unwrap_or_else(|| NO_TIER.to_string());

    let raw_started = payload
        .state
        .as_ref()
        .and_then(|state| state.started_at.as_deref())
        .ok_or_else(|| RuntimeError::parse(&subject, "missing State.StartedAt"))?;
    let started_at =
        parse_timestamp(raw_started).map_err(|reason| RuntimeError::parse(&subject, reason))?;

    Ok(ContainerRecord {
        id: id.to_string(),
        name,
        image_ref,
        tier,
        started_at,
        age_seconds: compute_age(started_at, now),
    })
}

/// Parse a runtime timestamp such as `2024-03-01T10:00:00.123456789Z`.
///
/// Fractional seconds are optional. Timestamps without a zone are taken as UTC.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}
