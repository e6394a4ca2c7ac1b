use std::{
    env, fs, io,
    path::{Component, Path, PathBuf},
};

use indexmap::IndexMap;
use shell_words::split;

use crate::{
    constants::{CONFIG_FILE, DEFAULT_ENV_DIR, DEFAULT_MANIFEST},
    error::BootstrapError,
};

/// Resolved settings for one bootstrap run.
///
/// Every path is absolute and anchored at the resolved anchor directory, so
/// later steps never depend on the caller's working directory.
#[derive(Debug)]
pub struct BootstrapConfig {
    pub anchor: PathBuf,
    pub env_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub python: Option<String>,
    pub install_args: Vec<String>,
    pub build_env: IndexMap<String, String>,
}

/// CLI-level settings that take precedence over `envup.toml`.
#[derive(Default)]
pub struct Overrides {
    pub manifest: Option<PathBuf>,
    pub python: Option<String>,
}

impl BootstrapConfig {
    /// Combine the anchor, the optional `envup.toml` beside it, and the CLI
    /// overrides into one resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `envup.toml` exists but cannot be read or parsed,
    /// or if one of its values has the wrong shape.
    pub fn load(anchor: PathBuf, overrides: Overrides) -> Result<Self, BootstrapError> {
        let file = load_envup_toml(&anchor)?;

        let env_dir_name = file.dir.unwrap_or_else(|| DEFAULT_ENV_DIR.to_string());
        // Anything but a plain directory name (".", "..", separators, an
        // absolute path) would let the environment directory alias or escape
        // the anchor, and `clean` must never remove anything outside it.
        let mut components = Path::new(&env_dir_name).components();
        let is_plain_name = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !is_plain_name {
            return Err(shape("env.dir", "a plain directory name"));
        }

        let manifest_path = match overrides.manifest {
            Some(path) if path.is_absolute() => path,
            Some(path) => anchor.join(path),
            None => anchor.join(file.manifest.unwrap_or_else(|| DEFAULT_MANIFEST.to_string())),
        };

        Ok(Self {
            env_dir: anchor.join(&env_dir_name),
            manifest_path,
            python: overrides.python.or(file.python),
            install_args: file.install_args,
            build_env: file.vars,
            anchor,
        })
    }
}

/// Resolve the directory the bootstrap anchors to.
///
/// Without an explicit `--dir`, this is the directory containing the running
/// executable. Canonicalization follows the full symlink chain, so invoking
/// the binary through a link anchors at the link target's directory.
///
/// # Errors
///
/// Returns an error if the executable location cannot be determined or the
/// candidate directory does not exist.
pub fn resolve_anchor_dir(dir_arg: Option<&Path>) -> Result<PathBuf, BootstrapError> {
    let candidate = match dir_arg {
        Some(path) => path.to_path_buf(),
        None => {
            let exe = env::current_exe().map_err(BootstrapError::Anchor)?;
            let exe = fs::canonicalize(&exe).map_err(BootstrapError::Anchor)?;
            exe.parent().map(Path::to_path_buf).ok_or_else(|| {
                BootstrapError::Anchor(io::Error::other("executable has no parent directory"))
            })?
        }
    };
    fs::canonicalize(&candidate).map_err(BootstrapError::Anchor)
}

#[derive(Default)]
struct FileConfig {
    dir: Option<String>,
    python: Option<String>,
    manifest: Option<String>,
    install_args: Vec<String>,
    vars: IndexMap<String, String>,
}

fn load_envup_toml(anchor: &Path) -> Result<FileConfig, BootstrapError> {
    let config_path = anchor.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|source| BootstrapError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let parsed: toml::Value =
        toml::from_str(&contents).map_err(|source| BootstrapError::ConfigParse {
            path: config_path.clone(),
            source,
        })?;

    let Some(env_value) = parsed.get("env") else {
        return Ok(FileConfig::default());
    };
    let env_table = env_value.as_table().ok_or_else(|| shape("env", "a table"))?;

    let mut config = FileConfig {
        dir: get_string(env_table, "dir")?,
        python: get_string(env_table, "python")?,
        manifest: get_string(env_table, "manifest")?,
        ..FileConfig::default()
    };
    if let Some(raw) = get_string(env_table, "install-args")? {
        config.install_args = split(&raw)?;
    }
    config.vars = parse_env_table(env_table.get("vars"))?;

    Ok(config)
}

fn get_string(
    table: &toml::value::Table,
    key: &str,
) -> Result<Option<String>, BootstrapError> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|value| Some(value.to_string()))
            .ok_or_else(|| shape(&format!("env.{key}"), "a string")),
    }
}

fn parse_env_table(value: Option<&toml::Value>) -> Result<IndexMap<String, String>, BootstrapError> {
    let mut env = IndexMap::new();

    let Some(value) = value else {
        return Ok(env);
    };

    let table = value
        .as_table()
        .ok_or_else(|| shape("env.vars", "a table of string key/value pairs"))?;

    for (key, val) in table {
        let val = val
            .as_str()
            .ok_or_else(|| shape(&format!("env.vars.{key}"), "a string"))?;
        env.insert(key.clone(), val.to_string());
    }

    Ok(env)
}

fn shape(section: &str, expected: &'static str) -> BootstrapError {
    BootstrapError::ConfigShape {
        section: section.to_string(),
        expected,
    }
}
