use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile};

use crate::error::BootstrapError;

/// A requirements manifest, normalized for installation.
///
/// Normalization keeps one specifier per line in file order and drops
/// comments and blank lines, so the digest only changes when the installed
/// set would change.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub specifiers: Vec<String>,
    pub digest: String,
}

impl Manifest {
    /// Load and normalize the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest does not exist or cannot be read.
    pub fn load(path: &Path) -> Result<Self, BootstrapError> {
        if !path.is_file() {
            return Err(BootstrapError::ManifestMissing {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|source| BootstrapError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        let specifiers = normalize(&raw);
        let digest = hash_parts(&specifiers);

        Ok(Self {
            path: path.to_path_buf(),
            specifiers,
            digest,
        })
    }

    /// Write the normalized specifiers to a temporary file handed to the installer.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created or written.
    pub fn to_install_file(&self) -> io::Result<NamedTempFile> {
        let mut temp = Builder::new().suffix(".txt").tempfile()?;
        for spec in &self.specifiers {
            writeln!(temp, "{spec}")?;
        }
        temp.flush()?;
        Ok(temp)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Digest of the full install state: the specifier set together with the
    /// interpreter request and extra installer arguments. This is what the
    /// done marker records, so changing any of them invalidates the cache.
    #[must_use]
    pub fn state_digest(&self, python: Option<&str>, install_args: &[String]) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + install_args.len());
        parts.push(&self.digest);
        parts.push(python.unwrap_or_default());
        parts.extend(install_args.iter().map(String::as_str));
        hash_parts(&parts)
    }
}

fn normalize(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}

/// Short stable digest over a sequence of parts.
fn hash_parts<S: AsRef<str>>(parts: &[S]) -> String {
    let mut sha = Sha256::new();
    for part in parts {
        sha.update(part.as_ref().as_bytes());
        sha.update(b"\n");
    }

    let digest = sha.finalize();
    let mut hex = String::with_capacity(16);
    for byte in &digest[..8] {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_manifest(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("requirements.txt");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            "# pinned for the API client\nrequests==2.31.0\n\n  anvl>=1.0\n",
        );

        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.specifiers, vec!["requests==2.31.0", "anvl>=1.0"]);
    }

    #[test]
    fn digest_ignores_formatting_only_edits() {
        let dir = tempfile::tempdir().unwrap();
        let plain = Manifest::load(&write_manifest(dir.path(), "requests==2.31.0\n")).unwrap();

        let other = tempfile::tempdir().unwrap();
        let commented = Manifest::load(&write_manifest(
            other.path(),
            "# comment\n\nrequests==2.31.0\n\n\n",
        ))
        .unwrap();

        assert_eq!(plain.digest, commented.digest);
    }

    #[test]
    fn digest_changes_with_the_installed_set() {
        let dir = tempfile::tempdir().unwrap();
        let one = Manifest::load(&write_manifest(dir.path(), "requests==2.31.0\n")).unwrap();

        let other = tempfile::tempdir().unwrap();
        let two = Manifest::load(&write_manifest(other.path(), "requests==2.32.0\n")).unwrap();

        assert_ne!(one.digest, two.digest);
    }

    #[test]
    fn state_digest_tracks_python_and_install_args() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::load(&write_manifest(dir.path(), "requests==2.31.0\n")).unwrap();

        let plain = manifest.state_digest(None, &[]);
        let with_python = manifest.state_digest(Some("3.12"), &[]);
        let with_args = manifest.state_digest(None, &["--no-cache".to_string()]);

        assert_ne!(plain, with_python);
        assert_ne!(plain, with_args);
        assert_ne!(with_python, with_args);
        assert_eq!(plain, manifest.state_digest(None, &[]));
    }

    #[test]
    fn missing_manifest_is_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("requirements.txt")).unwrap_err();
        assert!(matches!(err, BootstrapError::ManifestMissing { .. }));
    }

    #[test]
    fn install_file_holds_the_normalized_specifiers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "requests==2.31.0\n# dev only\npynmrstar\n");
        let manifest = Manifest::load(&path).unwrap();

        let install_file = manifest.to_install_file().unwrap();
        let written = fs::read_to_string(install_file.path()).unwrap();

        assert_eq!(written, "requests==2.31.0\npynmrstar\n");
    }
}
