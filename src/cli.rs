use std::{
    borrow::Cow,
    ffi::OsString,
    fmt::Display,
    io,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::{Duration, Instant},
};

use tokio::{process::Command, time::timeout};

use crate::config::Config;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot parse command line {cmd:?}: unbalanced quotes or trailing escape")]
    Parse { cmd: String },
    #[error("cannot quote {word:?}: {error}")]
    Quote {
        word: String,
        error: shlex::QuoteError,
    },
    #[error("failed to start {program:?}: {error}")]
    Spawn { program: OsString, error: io::Error },
    #[error("{program:?} {args:?} did not exit within {elapsed:?}")]
    Timeout {
        program: OsString,
        args: Vec<String>,
        elapsed: Duration,
    },
}

/// Splits a command line into words using POSIX shell quoting rules.
pub fn split(cmd: &str) -> Result<Vec<String>, Error> {
    shlex::split(cmd).ok_or_else(|| Error::Parse {
        cmd: cmd.to_string(),
    })
}

/// Quotes `word` so that [`split`] returns it unchanged.
pub fn quote(word: &str) -> Result<Cow<'_, str>, Error> {
    shlex::try_quote(word).map_err(|error| Error::Quote {
        word: word.to_string(),
        error,
    })
}

/// Runs the CLI under test, one process per call.
#[derive(Debug, Clone)]
pub struct Cli {
    program: OsString,
    leading_args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    timeout: Duration,
}

/// Captured result of a finished CLI process.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} exited with {}\nstderr:\n{}\nstdout:\n{}\n",
            self.args, self.status, self.stderr, self.stdout
        )
    }
}

impl Cli {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            program: config.cli.clone().into(),
            leading_args: split(&config.cli_args)?,
            dir: config.cli_dir.clone(),
            envs: vec![
                ("SOROBAN_RPC_URL".to_string(), config.rpc_url.clone()),
                (
                    "SOROBAN_NETWORK_PASSPHRASE".to_string(),
                    config.network_passphrase.clone(),
                ),
            ],
            timeout: config.cli_timeout,
        })
    }

    /// Adds a variable to the child environment, on top of the inherited one.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Full argument vector for `cmd`. Fails before anything is spawned when
    /// the command line is malformed.
    pub fn args(&self, cmd: &str) -> Result<Vec<String>, Error> {
        let mut args = self.leading_args.clone();
        args.extend(split(cmd)?);
        Ok(args)
    }

    pub async fn run(&self, cmd: &str) -> Result<Invocation, Error> {
        let args = self.args(cmd)?;
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .envs(self.envs.iter().cloned())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        tracing::info!(program = ?self.program, ?args, "running");

        let start = Instant::now();
        let output = match timeout(self.timeout, command.output()).await {
            Ok(output) => output.map_err(|error| Error::Spawn {
                program: self.program.clone(),
                error,
            })?,
            Err(_) => {
                return Err(Error::Timeout {
                    program: self.program.clone(),
                    args,
                    elapsed: start.elapsed(),
                })
            }
        };
        let invocation = Invocation {
            args,
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(status = %invocation.status, elapsed = ?start.elapsed());
        tracing::trace!(stdout = %invocation.stdout, stderr = %invocation.stderr);
        Ok(invocation)
    }
}
