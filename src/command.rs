use std::{
    env,
    ffi::OsStr,
    io,
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
};

use crate::constants::UV_REENTRY_VAR;

/// A wrapper around `std::process::Command` for the child tools envup runs.
///
/// Children inherit the terminal, so every diagnostic a failing step prints
/// reaches the user directly.
pub struct ManagedCommand {
    command: Command,
}

impl ManagedCommand {
    /// Create a new `ManagedCommand`.
    #[must_use]
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        let mut command = Command::new(program);
        command.stdin(Stdio::inherit());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        Self { command }
    }

    /// Create a command that re-executes the current binary as the embedded
    /// uv, so neither environment creation nor installation needs a
    /// system-wide uv on `PATH`.
    #[must_use]
    pub fn new_uv(subcommand: &str) -> Self {
        let program = env::current_exe().unwrap_or_else(|_| PathBuf::from("uv"));
        Self::new(program)
            .arg(subcommand)
            .arg("--no-config")
            .env(UV_REENTRY_VAR, "true")
            .env("UV_PYTHON_PREFERENCE", "only-managed")
    }

    /// Add arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command.args(args);
        self
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.command.arg(arg);
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.command.env(key, val);
        self
    }

    /// Set multiple environment variables for the command.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.command.envs(vars);
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn current_dir<P: AsRef<std::path::Path>>(mut self, dir: P) -> Self {
        self.command.current_dir(dir);
        self
    }

    /// Execute the command and wait for it to complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the child process cannot be spawned or waited on.
    pub fn status(mut self) -> io::Result<ExitStatus> {
        self.command.status()
    }
}
