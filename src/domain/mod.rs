pub mod bundle_archive;
pub mod directory_path;
pub mod environment;
pub mod path_error;
pub mod run_config;
pub mod staging;

// --- public re-exports ---
pub use directory_path::DirectoryPath;
pub use environment::{Environment, EnvironmentOrigin, KnownEnvironment};
pub use run_config::{RunConfig, UNKNOWN_TARGET};
pub use staging::{Overlap, StagingArea};
