use chrono::{DateTime, Utc};
use log::info;

use crate::age::collect_containers;
use crate::docker::{ContainerRuntime, DEFAULT_CONCURRENCY};
use crate::error::Result;
use crate::format::{render_age_report, render_usage_report, OutputFormat};
use crate::usage::collect_images;

pub const DEFAULT_TIER_LABEL: &str = "tier";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Age,
    Usage,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub mode: ReportMode,
    pub format: OutputFormat,
    pub tier_label: String,
    pub unused_only: bool,
    pub concurrency: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            mode: ReportMode::Age,
            format: OutputFormat::Plain,
            tier_label: DEFAULT_TIER_LABEL.to_string(),
            unused_only: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Take one snapshot of the runtime and render the requested report.
pub async fn generate(
    runtime: &dyn ContainerRuntime,
    options: &ReportOptions,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    match options.mode {
        ReportMode::Age => {
            let snapshot =
                collect_containers(runtime, options.concurrency, &options.tier_label, now).await?;
            if !snapshot.skipped.is_empty() {
                info!(
                    "{} of {} containers skipped",
                    snapshot.skipped.len(),
                    snapshot.skipped.len() + snapshot.records.len()
                );
            }
            Ok(render_age_report(
                &snapshot.records,
                &options.tier_label,
                options.format,
            ))
        }
        ReportMode::Usage => {
            let images = collect_images(runtime).await?;
            Ok(render_usage_report(
                &images,
                options.unused_only,
                options.format,
            ))
        }
    }
}
