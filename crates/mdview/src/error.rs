//! CLI error types.

use std::path::PathBuf;

use mdview_config::ConfigError;
use mdview_preview::PreviewError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Preview(#[from] PreviewError),

    #[error("Failed to build {}", .0.display())]
    Build(PathBuf),
}
