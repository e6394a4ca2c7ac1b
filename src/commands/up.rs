use crate::{
    command::ManagedCommand,
    config::BootstrapConfig,
    envdir,
    error::BootstrapError,
    manifest::Manifest,
    ui,
};

/// Outcome of a bootstrap step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Cached,
}

/// Run the bootstrap sequence: load the manifest, create the environment,
/// install the dependencies. Each step only runs if the previous one
/// succeeded, and the first failure is returned as-is.
///
/// # Errors
///
/// Returns an error if the manifest is missing or unreadable, or if
/// environment creation or installation fails.
pub fn run(config: &BootstrapConfig, refresh: bool) -> Result<(), BootstrapError> {
    let manifest = Manifest::load(&config.manifest_path)?;
    let state = manifest.state_digest(config.python.as_deref(), &config.install_args);

    ui::step(format!("Bootstrapping {}", config.env_dir.display()));
    ui::detail(format!(
        "manifest {} ({} specifiers)",
        manifest.path.display(),
        manifest.specifiers.len()
    ));

    if !refresh && envdir::is_current(&config.env_dir, &state) {
        ui::detail("environment is up to date, nothing to do");
        ui::blank_line();
        return Ok(());
    }

    match create_environment(config, refresh)? {
        StepOutcome::Cached => ui::detail("reusing existing environment"),
        StepOutcome::Done => ui::detail("environment created"),
    }

    install_dependencies(config, &manifest)?;
    envdir::write_marker(&config.env_dir, &state)?;

    ui::detail(format!(
        "activate with `source {}`",
        envdir::activation_path(&config.env_dir).display()
    ));
    ui::blank_line();

    Ok(())
}

fn create_environment(
    config: &BootstrapConfig,
    refresh: bool,
) -> Result<StepOutcome, BootstrapError> {
    if !refresh && envdir::python_path(&config.env_dir).is_file() {
        return Ok(StepOutcome::Cached);
    }

    let mut command = ManagedCommand::new_uv("venv").envs(&config.build_env);
    if let Some(python) = &config.python {
        command = command.arg("--python").arg(python);
    }

    let status = command
        .arg("--clear")
        .arg(&config.env_dir)
        .status()
        .map_err(|source| BootstrapError::Spawn {
            step: "uv venv",
            source,
        })?;

    if !status.success() {
        return Err(BootstrapError::ToolFailed {
            step: "uv venv",
            status,
        });
    }

    Ok(StepOutcome::Done)
}

fn install_dependencies(
    config: &BootstrapConfig,
    manifest: &Manifest,
) -> Result<(), BootstrapError> {
    // An interrupted install must not leave a stale marker behind.
    envdir::clear_marker(&config.env_dir)?;

    if manifest.is_empty() {
        ui::detail("manifest lists no dependencies, skipping install");
        return Ok(());
    }

    let install_file = manifest.to_install_file()?;

    // The installer is pointed at the environment's interpreter explicitly,
    // instead of relying on an activated PATH.
    let status = ManagedCommand::new_uv("pip")
        .envs(&config.build_env)
        .arg("install")
        .arg("--python")
        .arg(envdir::python_path(&config.env_dir))
        .arg("--requirement")
        .arg(install_file.path())
        .args(&config.install_args)
        .status()
        .map_err(|source| BootstrapError::Spawn {
            step: "uv pip install",
            source,
        })?;

    if !status.success() {
        return Err(BootstrapError::ToolFailed {
            step: "uv pip install",
            status,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::Overrides;

    fn config_for(anchor: &std::path::Path) -> BootstrapConfig {
        BootstrapConfig::load(anchor.to_path_buf(), Overrides::default()).unwrap()
    }

    #[test]
    fn missing_manifest_halts_before_touching_the_environment() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        let err = run(&config, false).unwrap_err();

        assert!(matches!(err, BootstrapError::ManifestMissing { .. }));
        assert!(!config.env_dir.exists());
    }

    #[test]
    fn rerunning_with_an_unchanged_manifest_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests==2.31.0\n").unwrap();
        let config = config_for(dir.path());

        let manifest = Manifest::load(&config.manifest_path).unwrap();
        let state = manifest.state_digest(config.python.as_deref(), &config.install_args);
        let python = envdir::python_path(&config.env_dir);
        fs::create_dir_all(python.parent().unwrap()).unwrap();
        fs::write(&python, "").unwrap();
        envdir::write_marker(&config.env_dir, &state).unwrap();

        run(&config, false).unwrap();

        // The fake interpreter survives because no step re-ran.
        assert!(python.is_file());
        assert_eq!(envdir::read_marker(&config.env_dir), Some(state));
    }

    #[test]
    fn changing_the_python_request_invalidates_the_install_state() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests==2.31.0\n").unwrap();
        let config = config_for(dir.path());

        let manifest = Manifest::load(&config.manifest_path).unwrap();
        let state = manifest.state_digest(None, &config.install_args);
        let python = envdir::python_path(&config.env_dir);
        fs::create_dir_all(python.parent().unwrap()).unwrap();
        fs::write(&python, "").unwrap();
        envdir::write_marker(&config.env_dir, &state).unwrap();

        // Same manifest, different interpreter request: the recorded state
        // no longer matches, so the no-op gate must not trigger.
        let requested = manifest.state_digest(Some("3.12"), &config.install_args);
        assert!(!envdir::is_current(&config.env_dir, &requested));
    }
}
