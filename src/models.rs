use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RuntimeError;

/// Tier value used when a container carries no tier label.
pub const NO_TIER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRecord {
    // Identity
    pub id: String,
    pub name: String,
    pub image_ref: String,
    pub tier: String,

    // Timing
    pub started_at: DateTime<Utc>,
    pub age_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub reference: String,
    pub repository: String,
    pub in_use: bool,
}

impl ImageRecord {
    pub fn status(&self) -> &'static str {
        if self.in_use {
            "IN USE"
        } else {
            "UNUSED"
        }
    }
}

/// A container that was dropped from the snapshot.
#[derive(Debug)]
pub struct SkippedContainer {
    pub id: String,
    pub error: RuntimeError,
}

/// Everything collected about running containers in one pass.
#[derive(Debug, Default)]
pub struct ContainerSnapshot {
    pub records: Vec<ContainerRecord>,
    pub skipped: Vec<SkippedContainer>,
}
