use std::path::PathBuf;
use thiserror::Error;

// ─── Retention errors ────────────────────────────────────────────────────────

/// Failure of a single `apply` run.
///
/// The variants form a closed set so callers can tell a misbehaving
/// collaborator apart from an unsafe or failed disposal.
#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("finder contract violated: {0}")]
    ContractViolation(String),

    #[error("refusing to prune shallow path {} ({components} components)", .path.display())]
    UnsafeOperation { path: PathBuf, components: usize },

    #[error("failed to prune {}: {source}", .path.display())]
    Disposal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to keep in {}", .target.display())]
    EmptyResult { target: PathBuf },

    #[error("failed to list candidates in {}: {source}", .target.display())]
    Discovery {
        target: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

// ─── Pruner errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PruneError {
    #[error("path {} has only {components} components", .path.display())]
    Unsafe { path: PathBuf, components: usize },

    #[error("io on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<PruneError> for RetentionError {
    fn from(err: PruneError) -> Self {
        match err {
            PruneError::Unsafe { path, components } => {
                Self::UnsafeOperation { path, components }
            }
            PruneError::Io { path, source } => Self::Disposal { path, source },
        }
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for retention runs.
pub type Result<T> = std::result::Result<T, RetentionError>;
