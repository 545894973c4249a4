pub mod age;
pub mod docker;
pub mod error;
pub mod format;
pub mod models;
pub mod parse;
pub mod report;
pub mod usage;

// Re-exports for easy access
pub use docker::{ClientConfig, ContainerRuntime, DockerClient};
pub use error::RuntimeError;
pub use format::OutputFormat;
pub use models::{ContainerRecord, ContainerSnapshot, ImageRecord};
pub use report::{generate, ReportMode, ReportOptions};
