use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Failures surfaced by the bootstrap sequence and its supporting commands.
///
/// Each step of the sequence returns one of these so the orchestrator can
/// halt at the first failure instead of running later steps against a
/// broken environment.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not resolve the anchor directory: {0}")]
    Anchor(io::Error),
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{section} must be {expected}")]
    ConfigShape {
        section: String,
        expected: &'static str,
    },
    #[error("env.install-args is not a valid shell string: {0}")]
    InstallArgs(#[from] shell_words::ParseError),
    #[error("requirements manifest {} does not exist", path.display())]
    ManifestMissing { path: PathBuf },
    #[error("failed to read requirements manifest {}: {source}", path.display())]
    ManifestRead { path: PathBuf, source: io::Error },
    #[error("failed to spawn {step}: {source}")]
    Spawn {
        step: &'static str,
        source: io::Error,
    },
    #[error("{step} failed with {status}")]
    ToolFailed {
        step: &'static str,
        status: ExitStatus,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to serialize description as JSON: {0}")]
    Json(#[from] serde_json::Error),
}
