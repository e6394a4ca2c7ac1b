use std::fs;

use crate::{config::BootstrapConfig, error::BootstrapError, ui};

/// Remove the environment directory. A missing directory is not an error.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn run(config: &BootstrapConfig) -> Result<(), BootstrapError> {
    ui::step(format!(
        "Removing environment {}",
        config.env_dir.display()
    ));

    if !config.env_dir.exists() {
        ui::detail("environment not found, nothing to clean");
        ui::blank_line();
        return Ok(());
    }

    fs::remove_dir_all(&config.env_dir)?;
    ui::blank_line();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::Overrides;

    #[test]
    fn cleaning_a_missing_environment_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            BootstrapConfig::load(dir.path().to_path_buf(), Overrides::default()).unwrap();

        run(&config).unwrap();
    }

    #[test]
    fn cleaning_removes_the_environment_tree() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            BootstrapConfig::load(dir.path().to_path_buf(), Overrides::default()).unwrap();
        fs::create_dir_all(config.env_dir.join("bin")).unwrap();
        fs::write(config.env_dir.join("bin/python"), "").unwrap();

        run(&config).unwrap();

        assert!(!config.env_dir.exists());
        // The anchor itself is untouched.
        assert!(dir.path().exists());
    }
}
