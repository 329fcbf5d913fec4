use std::path::PathBuf;

use listenlint_common::ConfigError;

/// Failures that stop a run before or while linting. Findings are never
/// errors; these map to exit code 2.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("path not found: '{}'", .0.display())]
    MissingPath(PathBuf),
    #[error("no input files")]
    NoInput,
    #[error("could not determine the working directory: {0}")]
    WorkingDir(std::io::Error),
    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
