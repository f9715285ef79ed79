//! Error types for tree building.

/// Failure reported by a builder collaborator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DelegateError {
    /// Link handler could not be created.
    #[error("cannot create link handler for `{href}`: {message}")]
    Link {
        /// Link target.
        href: String,
        /// Error message.
        message: String,
    },
    /// Image could not be loaded.
    #[error("cannot load image `{src}`: {message}")]
    Image {
        /// Image locator.
        src: String,
        /// Error message.
        message: String,
    },
    /// Code block could not be formatted.
    #[error("cannot format code block: {0}")]
    Highlight(String),
}

/// Tree building error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A collaborator failed.
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}
