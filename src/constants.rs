//! Constants used throughout the envup codebase

/// Default directory name for the isolated environment
pub const DEFAULT_ENV_DIR: &str = ".venv";

/// Default requirements manifest file name
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Optional configuration file, looked up beside the anchor directory
pub const CONFIG_FILE: &str = "envup.toml";

/// Marker file recording the manifest digest of the last successful install
pub const DONE_MARKER: &str = ".envup-done";

/// Environment variable that re-enters the binary as the embedded uv
pub const UV_REENTRY_VAR: &str = "ENVUP_IS_UV";
