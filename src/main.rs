#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::{env::args, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::CompleteEnv;

use envup::{
    commands,
    config::{BootstrapConfig, Overrides, resolve_anchor_dir},
    constants::UV_REENTRY_VAR,
    error::BootstrapError,
};

#[derive(Parser)]
#[command(
    name = "envup",
    version,
    about = "Bootstrap an isolated Python environment next to the project."
)]
struct Cli {
    /// Anchor directory to bootstrap into. Defaults to the directory of the
    /// running executable, symlinks resolved.
    #[arg(short, long, value_name = "PATH", add = ValueHint::DirPath)]
    dir: Option<PathBuf>,
    /// Requirements manifest to install. Defaults to requirements.txt beside the anchor.
    #[arg(short, long, value_name = "PATH", add = ValueHint::FilePath)]
    manifest: Option<PathBuf>,
    /// Python version request forwarded to environment creation.
    #[arg(short, long, value_name = "PYTHON")]
    python: Option<String>,
    /// Recreate the environment and reinstall even when it is up to date.
    #[arg(long, global = true)]
    refresh: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the environment and install the manifest (the default).
    Up,
    /// Show the resolved configuration and environment state.
    Describe {
        /// Output the description as JSON instead of a key/value listing.
        #[arg(long)]
        json: bool,
    },
    /// Remove the environment directory.
    Clean,
}

fn run_command(
    config: &BootstrapConfig,
    command: Option<Commands>,
    refresh: bool,
) -> Result<(), BootstrapError> {
    match command.unwrap_or(Commands::Up) {
        Commands::Up => commands::up::run(config, refresh),
        Commands::Describe { json } => commands::describe::run(config, json),
        Commands::Clean => commands::clean::run(config),
    }
}

fn main() -> ExitCode {
    if let Ok(value) = std::env::var(UV_REENTRY_VAR)
        && value == "true"
    {
        return unsafe { uv::main(args()) };
    }

    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();

    let anchor = match resolve_anchor_dir(cli.dir.as_deref()) {
        Ok(anchor) => anchor,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let overrides = Overrides {
        manifest: cli.manifest,
        python: cli.python,
    };
    let config = match BootstrapConfig::load(anchor, overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_command(&config, cli.command, cli.refresh) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
