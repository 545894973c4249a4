use std::collections::HashSet;

use log::debug;

use crate::docker::ContainerRuntime;
use crate::error::Result;
use crate::models::ImageRecord;

/// Placeholder the runtime uses for a missing repository or tag.
pub const NONE_PLACEHOLDER: &str = "<none>";

/// Strip the tag (and any digest) from an image reference.
///
/// A `:` only starts a tag when no `/` follows it, so registry ports survive:
/// `registry:5000/app:1.0` becomes `registry:5000/app`.
pub fn repository_of(reference: &str) -> &str {
    let without_digest = match reference.split_once('@') {
        Some((name, _)) => name,
        None => reference,
    };

    match without_digest.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => repo,
        _ => without_digest,
    }
}

/// True for images with neither repository nor tag.
pub fn is_dangling(reference: &str) -> bool {
    match reference.rsplit_once(':') {
        Some((repo, tag)) => repo == NONE_PLACEHOLDER && tag == NONE_PLACEHOLDER,
        None => false,
    }
}

/// Classify stored references against the running set.
///
/// An image is in use when its full reference or its bare repository is
/// running. Output keeps the runtime's order; dangling and repeated
/// references are dropped.
pub fn classify_images(references: &[String], running: &HashSet<String>) -> Vec<ImageRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut images = Vec::new();

    for reference in references {
        let reference = reference.as_str();
        if reference.is_empty() || is_dangling(reference) || !seen.insert(reference) {
            continue;
        }

        let repository = repository_of(reference);
        let in_use = running.contains(reference) || running.contains(repository);

        images.push(ImageRecord {
            reference: reference.to_string(),
            repository: repository.to_string(),
            in_use,
        });
    }

    images
}

/// Query stored and running images and classify them.
pub async fn collect_images(runtime: &dyn ContainerRuntime) -> Result<Vec<ImageRecord>> {
    let references = runtime.list_image_references().await?;
    let running = runtime.list_running_image_references().await?;
    debug!(
        "Classifying {} stored image references against {} running",
        references.len(),
        running.len()
    );

    Ok(classify_images(&references, &running))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn running(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_repository_of() {
        assert_eq!(repository_of("app:1.0"), "app");
        assert_eq!(repository_of("app"), "app");
        assert_eq!(repository_of("library/ubuntu:22.04"), "library/ubuntu");
        assert_eq!(repository_of("registry:5000/app:1.0"), "registry:5000/app");
        assert_eq!(repository_of("registry:5000/app"), "registry:5000/app");
        assert_eq!(repository_of("alpine@sha256:abc123"), "alpine");
        assert_eq!(repository_of("<none>:<none>"), "<none>");
    }

    #[test]
    fn test_is_dangling() {
        assert!(is_dangling("<none>:<none>"));
        assert!(!is_dangling("<none>:1.0"));
        assert!(!is_dangling("app:<none>"));
        assert!(!is_dangling("app:1.0"));
        assert!(!is_dangling("<none>"));
    }

    #[test]
    fn test_mixed_fleet_classification() {
        let images = classify_images(
            &refs(&["app:1.0", "app:2.0", "<none>:<none>"]),
            &running(&["app:2.0"]),
        );

        let summary: Vec<_> = images
            .iter()
            .map(|i| (i.reference.as_str(), i.status()))
            .collect();
        assert_eq!(summary, vec![("app:1.0", "UNUSED"), ("app:2.0", "IN USE")]);
    }

    #[test]
    fn test_repository_fallback_marks_in_use() {
        let images = classify_images(&refs(&["app:1.0", "db:5"]), &running(&["app"]));

        assert!(images[0].in_use);
        assert_eq!(images[0].repository, "app");
        assert!(!images[1].in_use);
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let images = classify_images(
            &refs(&["app:1.0", "myapp:1.0"]),
            &running(&["app-worker:1.0", "my"]),
        );
        assert!(images.iter().all(|i| !i.in_use));
    }

    #[test]
    fn test_duplicates_and_blanks_dropped() {
        let images = classify_images(
            &refs(&["app:1.0", "", "app:1.0", "web:2"]),
            &running(&[]),
        );
        let names: Vec<_> = images.iter().map(|i| i.reference.as_str()).collect();
        assert_eq!(names, vec!["app:1.0", "web:2"]);
    }
}
