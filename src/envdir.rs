use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::constants::DONE_MARKER;

/// Interpreter path inside the environment.
#[must_use]
pub fn python_path(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts/python.exe")
    } else {
        env_dir.join("bin/python")
    }
}

/// Activation script sourced by interactive shells.
#[must_use]
pub fn activation_path(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts/activate")
    } else {
        env_dir.join("bin/activate")
    }
}

fn marker_path(env_dir: &Path) -> PathBuf {
    env_dir.join(DONE_MARKER)
}

/// Manifest digest recorded by the last successful install, if any.
#[must_use]
pub fn read_marker(env_dir: &Path) -> Option<String> {
    let contents = fs::read_to_string(marker_path(env_dir)).ok()?;
    let digest = contents.trim();
    (!digest.is_empty()).then(|| digest.to_string())
}

/// Record `digest` as the installed manifest state.
///
/// # Errors
///
/// Returns an error if the marker file cannot be written.
pub fn write_marker(env_dir: &Path, digest: &str) -> io::Result<()> {
    fs::write(marker_path(env_dir), format!("{digest}\n"))
}

/// Drop the recorded install state. A missing marker is not an error.
///
/// # Errors
///
/// Returns an error if an existing marker cannot be removed.
pub fn clear_marker(env_dir: &Path) -> io::Result<()> {
    match fs::remove_file(marker_path(env_dir)) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// True when the environment's interpreter exists and the recorded digest
/// matches the current manifest digest.
#[must_use]
pub fn is_current(env_dir: &Path, digest: &str) -> bool {
    python_path(env_dir).is_file()
        && read_marker(env_dir).is_some_and(|recorded| recorded == digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_environment(env_dir: &Path) {
        let python = python_path(env_dir);
        fs::create_dir_all(python.parent().unwrap()).unwrap();
        fs::write(&python, "").unwrap();
    }

    #[test]
    fn marker_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        write_marker(dir.path(), "deadbeefcafe0123").unwrap();
        assert_eq!(
            read_marker(dir.path()).as_deref(),
            Some("deadbeefcafe0123")
        );

        clear_marker(dir.path()).unwrap();
        assert!(read_marker(dir.path()).is_none());
    }

    #[test]
    fn clearing_a_missing_marker_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        clear_marker(dir.path()).unwrap();
    }

    #[test]
    fn an_environment_without_an_interpreter_is_never_current() {
        let dir = tempfile::tempdir().unwrap();
        write_marker(dir.path(), "deadbeefcafe0123").unwrap();
        assert!(!is_current(dir.path(), "deadbeefcafe0123"));
    }

    #[test]
    fn matching_digest_and_interpreter_are_current() {
        let dir = tempfile::tempdir().unwrap();
        fake_environment(dir.path());
        write_marker(dir.path(), "deadbeefcafe0123").unwrap();

        assert!(is_current(dir.path(), "deadbeefcafe0123"));
        assert!(!is_current(dir.path(), "0123cafedeadbeef"));
    }
}
