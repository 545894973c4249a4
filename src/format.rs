use std::cmp::Ordering;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

use crate::models::{ContainerRecord, ImageRecord};

const SEPARATOR_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pipe-delimited lines, stable for scripts
    #[default]
    Plain,
    /// Boxed table for humans
    Table,
    Json,
}

/// Oldest first; equal ages fall back to name so output is stable.
pub fn sort_by_age(records: &mut [ContainerRecord]) {
    records.sort_by(|a, b| match b.age_seconds.cmp(&a.age_seconds) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
}

pub fn render_age_report(
    records: &[ContainerRecord],
    tier_label: &str,
    format: OutputFormat,
) -> Vec<String> {
    let mut rows = records.to_vec();
    sort_by_age(&mut rows);

    match format {
        OutputFormat::Plain => {
            let mut lines = vec![
                format!("NAME | AGE_SECONDS | IMAGE | {}", tier_label),
                "-".repeat(SEPARATOR_WIDTH),
            ];
            lines.extend(rows.iter().map(|r| {
                format!("{} | {} | {} | {}", r.name, r.age_seconds, r.image_ref, r.tier)
            }));
            lines
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Name", "Age (s)", "Image", tier_label]);

            for r in &rows {
                let age = r.age_seconds.to_string();
                builder.push_record([
                    r.name.as_str(),
                    age.as_str(),
                    r.image_ref.as_str(),
                    r.tier.as_str(),
                ]);
            }

            let mut lines = vec![format!("{}", "Container Ages".bold().underline())];
            lines.extend(table_lines(builder));
            lines.push(format!("{} running containers", rows.len()));
            lines
        }
        OutputFormat::Json => json_lines(&rows),
    }
}

#[derive(Serialize)]
struct UsageJson<'a> {
    images: Vec<&'a ImageRecord>,
    unused: usize,
}

pub fn render_usage_report(
    images: &[ImageRecord],
    unused_only: bool,
    format: OutputFormat,
) -> Vec<String> {
    let unused = images.iter().filter(|i| !i.in_use).count();
    let shown: Vec<&ImageRecord> = images
        .iter()
        .filter(|i| !unused_only || !i.in_use)
        .collect();

    match format {
        OutputFormat::Plain => {
            let mut lines = vec![
                "Image Usage Report".to_string(),
                "-".repeat(SEPARATOR_WIDTH),
            ];
            lines.extend(
                shown
                    .iter()
                    .map(|i| format!("{} -> {}", i.reference, i.status())),
            );
            lines.push(usage_summary(images.len(), unused));
            lines
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Image", "Repository", "Status"]);

            for image in &shown {
                let status = if image.in_use {
                    image.status().green().to_string()
                } else {
                    image.status().yellow().to_string()
                };
                builder.push_record([
                    image.reference.as_str(),
                    image.repository.as_str(),
                    status.as_str(),
                ]);
            }

            let mut lines = vec![format!("{}", "Image Usage".bold().underline())];
            lines.extend(table_lines(builder));
            lines.push(format!("{}", usage_summary(images.len(), unused).bold()));
            lines
        }
        OutputFormat::Json => json_lines(&UsageJson {
            images: shown,
            unused,
        }),
    }
}

fn usage_summary(total: usize, unused: usize) -> String {
    if total == 0 {
        "No images found".to_string()
    } else if unused == 0 {
        "All images are in use!".to_string()
    } else {
        format!("Total unused: {}", unused)
    }
}

fn table_lines(builder: Builder) -> Vec<String> {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string().lines().map(str::to_string).collect()
}

fn json_lines<T: Serialize + ?Sized>(value: &T) -> Vec<String> {
    // Serializing plain records into a String cannot fail
    let json = serde_json::to_string_pretty(value).unwrap_or_default();
    json.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn container(name: &str, age: u64, image: &str, tier: &str) -> ContainerRecord {
        ContainerRecord {
            id: format!("id-{}", name),
            name: name.to_string(),
            image_ref: image.to_string(),
            tier: tier.to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            age_seconds: age,
        }
    }

    fn image(reference: &str, in_use: bool) -> ImageRecord {
        ImageRecord {
            reference: reference.to_string(),
            repository: crate::usage::repository_of(reference).to_string(),
            in_use,
        }
    }

    #[test]
    fn test_age_report_order_breaks_ties_by_name() {
        let records = vec![
            container("web", 120, "nginx:1.25", "frontend"),
            container("cache", 45, "redis:7", "N/A"),
            container("api", 120, "api:2.1", "backend"),
        ];

        let lines = render_age_report(&records, "tier", OutputFormat::Plain);

        assert_eq!(
            lines,
            vec![
                "NAME | AGE_SECONDS | IMAGE | tier".to_string(),
                "-".repeat(60),
                "api | 120 | api:2.1 | backend".to_string(),
                "web | 120 | nginx:1.25 | frontend".to_string(),
                "cache | 45 | redis:7 | N/A".to_string(),
            ]
        );
    }

    #[test]
    fn test_age_rows_are_non_increasing() {
        let mut records: Vec<_> = [(5, "e"), (90, "b"), (5, "a"), (300, "z"), (90, "a")]
            .iter()
            .map(|(age, name)| container(name, *age, "img", "N/A"))
            .collect();
        sort_by_age(&mut records);

        for pair in records.windows(2) {
            assert!(pair[0].age_seconds >= pair[1].age_seconds);
            if pair[0].age_seconds == pair[1].age_seconds {
                assert!(pair[0].name <= pair[1].name);
            }
        }
    }

    #[test]
    fn test_empty_age_report_is_header_only() {
        let lines = render_age_report(&[], "tier", OutputFormat::Plain);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "NAME | AGE_SECONDS | IMAGE | tier");
    }

    #[test]
    fn test_usage_report_lines_and_summary() {
        let images = vec![image("app:1.0", false), image("app:2.0", true)];
        let lines = render_usage_report(&images, false, OutputFormat::Plain);

        assert_eq!(
            &lines[2..],
            ["app:1.0 -> UNUSED", "app:2.0 -> IN USE", "Total unused: 1"]
        );
    }

    #[test]
    fn test_usage_summary_variants() {
        let all_used =
            render_usage_report(&[image("app:2.0", true)], false, OutputFormat::Plain);
        assert_eq!(all_used.last().unwrap(), "All images are in use!");

        let none = render_usage_report(&[], false, OutputFormat::Plain);
        assert_eq!(none.last().unwrap(), "No images found");
    }

    #[test]
    fn test_unused_only_hides_in_use_rows() {
        let images = vec![image("app:1.0", false), image("app:2.0", true), image("db:5", false)];
        let lines = render_usage_report(&images, true, OutputFormat::Plain);

        assert_eq!(&lines[2..], ["app:1.0 -> UNUSED", "db:5 -> UNUSED", "Total unused: 2"]);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let records = vec![container("web", 10, "nginx", "N/A"), container("db", 10, "pg", "data")];
        let images = vec![image("nginx:latest", true), image("old:0.1", false)];

        for format in [OutputFormat::Plain, OutputFormat::Table, OutputFormat::Json] {
            assert_eq!(
                render_age_report(&records, "tier", format),
                render_age_report(&records, "tier", format)
            );
            assert_eq!(
                render_usage_report(&images, false, format),
                render_usage_report(&images, false, format)
            );
        }
    }

    #[test]
    fn test_json_age_report_is_sorted_records() {
        let records = vec![container("young", 1, "a", "N/A"), container("old", 99, "b", "N/A")];
        let json = render_age_report(&records, "tier", OutputFormat::Json).join("\n");

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "old");
        assert_eq!(parsed[0]["age_seconds"], 99);
        assert_eq!(parsed[1]["name"], "young");
    }

    #[test]
    fn test_json_usage_report_counts_unused() {
        let images = vec![image("app:1.0", false), image("app:2.0", true)];
        let json = render_usage_report(&images, false, OutputFormat::Json).join("\n");

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["unused"], 1);
        assert_eq!(parsed["images"][1]["in_use"], true);
    }

    #[test]
    fn test_table_report_contains_rows() {
        let records = vec![container("api", 120, "api:2.1", "backend")];
        let table = render_age_report(&records, "tier", OutputFormat::Table).join("\n");

        assert!(table.contains("api:2.1"));
        assert!(table.contains("backend"));
        assert!(table.contains("1 running containers"));
    }
}
