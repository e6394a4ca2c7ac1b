use crossterm::style::{Attribute, Stylize};
use itertools::Itertools;
use serde::Serialize;
use serde_json::to_string_pretty;

use crate::{config::BootstrapConfig, envdir, error::BootstrapError, manifest::Manifest};

#[derive(Serialize)]
struct JsonDescription {
    anchor: String,
    env_dir: String,
    interpreter: String,
    activation: String,
    python_request: Option<String>,
    manifest: String,
    manifest_present: bool,
    specifiers: Vec<String>,
    digest: Option<String>,
    up_to_date: bool,
}

/// Show the resolved configuration and the environment's current state.
///
/// # Errors
///
/// Returns an error if the manifest exists but cannot be read, or if JSON
/// serialization fails.
pub fn run(config: &BootstrapConfig, json: bool) -> Result<(), BootstrapError> {
    let manifest = match Manifest::load(&config.manifest_path) {
        Ok(manifest) => Some(manifest),
        Err(BootstrapError::ManifestMissing { .. }) => None,
        Err(err) => return Err(err),
    };
    let up_to_date = manifest.as_ref().is_some_and(|manifest| {
        let state = manifest.state_digest(config.python.as_deref(), &config.install_args);
        envdir::is_current(&config.env_dir, &state)
    });

    if json {
        let description = JsonDescription {
            anchor: config.anchor.display().to_string(),
            env_dir: config.env_dir.display().to_string(),
            interpreter: envdir::python_path(&config.env_dir).display().to_string(),
            activation: envdir::activation_path(&config.env_dir)
                .display()
                .to_string(),
            python_request: config.python.clone(),
            manifest: config.manifest_path.display().to_string(),
            manifest_present: manifest.is_some(),
            specifiers: manifest
                .as_ref()
                .map(|manifest| manifest.specifiers.clone())
                .unwrap_or_default(),
            digest: manifest.as_ref().map(|manifest| manifest.digest.clone()),
            up_to_date,
        };
        println!("{}", to_string_pretty(&description)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Environment".bold().cyan(),
        config.env_dir.display().to_string().bold().blue()
    );
    print_kv("anchor", config.anchor.display());
    print_kv("interpreter", envdir::python_path(&config.env_dir).display());
    print_kv("activate", envdir::activation_path(&config.env_dir).display());
    if let Some(python) = &config.python {
        print_kv("python request", python.as_str().bold().green());
    }

    match &manifest {
        Some(manifest) => {
            print_kv("manifest", manifest.path.display());
            print_kv("digest", manifest.digest.as_str().cyan());
            if manifest.specifiers.is_empty() {
                print_kv("specifiers", "<none>".attribute(Attribute::Dim));
            } else {
                print_kv(
                    "specifiers",
                    manifest.specifiers.iter().join(", ").bold().yellow(),
                );
            }
        }
        None => print_kv(
            "manifest",
            format!(
                "{} {}",
                config.manifest_path.display(),
                "<missing>".attribute(Attribute::Dim)
            ),
        ),
    }

    print_kv("up to date", bool_flag(up_to_date));

    Ok(())
}

fn print_kv(label: &str, value: impl std::fmt::Display) {
    println!("  {} {value}", format!("{label}:").attribute(Attribute::Dim));
}

fn bool_flag(value: bool) -> String {
    if value {
        "yes".bold().green().to_string()
    } else {
        "no".bold().red().to_string()
    }
}
