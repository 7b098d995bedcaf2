/// Crate-level error types for mdmend.
use std::path::PathBuf;

/// All errors in mdmend carry enough context to produce a useful diagnostic
/// without a debugger. Per-document and per-link problems are never errors;
/// only configuration and inventory construction can fail the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An include or exclude glob pattern failed to compile.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlob {
        /// The glob pattern as written in the config.
        pattern: String,
        /// Description of the compile failure.
        reason: String,
    },

    /// A link pattern is not a valid regular expression.
    #[error("invalid link pattern `{pattern}`: {reason}")]
    InvalidLinkPattern {
        /// The link pattern as written in the config.
        pattern: String,
        /// Description of the compile failure.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of the report failed.
    #[error("json serialize: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A link pattern compiled but lacks the required capture groups.
    #[error("link pattern `{pattern}` has {found} capture groups, needs 2 (display text, target)")]
    MissingCaptureGroups {
        /// Number of capture groups the pattern actually has.
        found: usize,
        /// The link pattern as written in the config.
        pattern: String,
    },

    /// The scanned root directory does not exist.
    #[error("root not found: {}", path.display())]
    RootNotFound {
        /// Path that was given as the scan root.
        path: PathBuf,
    },

    /// TOML deserialization of the config file failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
