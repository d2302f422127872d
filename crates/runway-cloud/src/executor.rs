use crate::error::ExecError;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// External tools runway drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Gcloud,
    Terraform,
}

impl Program {
    pub fn binary(self) -> &'static str {
        match self {
            Program::Gcloud => "gcloud",
            Program::Terraform => "terraform",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Environment variables handed to a single child process.
///
/// Values are credentials more often than not, so they are held as
/// [`SecretString`] and never printed.
#[derive(Clone, Default)]
pub struct CommandEnv {
    vars: BTreeMap<String, SecretString>,
}

impl CommandEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: SecretString) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&SecretString> {
        self.vars.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl fmt::Debug for CommandEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.vars.keys().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}

/// One external command: program, arguments, and where/how to run it.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: Program,
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
    pub env: CommandEnv,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new<const N: usize>(program: Program, args: [&str; N]) -> Self {
        Self {
            program,
            args: args.iter().map(|s| (*s).to_owned()).collect(),
            dir: None,
            env: CommandEnv::default(),
            timeout: None,
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    pub fn with_env(mut self, env: &CommandEnv) -> Self {
        self.env = env.clone();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// True when the first `prefix.len()` arguments equal `prefix`.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(self.program.binary());
        cmd.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (name, value) in &self.env.vars {
            cmd.env(name, value.expose_secret());
        }
        cmd
    }
}

/// Abstraction over external command execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion and capture stdout.
    async fn exec(&self, invocation: &Invocation) -> Result<String, ExecError>;

    /// Run a command attached to the operator's terminal.
    async fn exec_interactive(&self, invocation: &Invocation) -> Result<(), ExecError>;
}

/// Real executor backed by `tokio::process`.
///
/// Clones share a busy flag, so a signal handler holding one clone can tell
/// whether a command is currently running.
#[derive(Debug, Clone, Default)]
pub struct RealExecutor {
    busy: Arc<AtomicBool>,
}

impl RealExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an external command is running right now.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn mark_busy(&self) -> BusyGuard {
        self.busy.store(true, Ordering::SeqCst);
        BusyGuard(Arc::clone(&self.busy))
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CommandExecutor for RealExecutor {
    async fn exec(&self, invocation: &Invocation) -> Result<String, ExecError> {
        use std::process::Stdio;

        let program = invocation.program;
        tracing::debug!(
            %program,
            args = ?invocation.args,
            env = ?invocation.env,
            "running command"
        );

        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let _busy = self.mark_busy();
        let output = cmd.output();

        let output = match invocation.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| ExecError::Timeout {
                    program,
                    after: limit,
                })?,
            None => output.await,
        }
        .map_err(|e| ExecError::Spawn { program, source: e })?;

        if output.status.success() {
            String::from_utf8(output.stdout)
                .map_err(|e| ExecError::InvalidUtf8 { program, source: e })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(ExecError::CommandFailed {
                program,
                args: invocation.args.clone(),
                stderr,
            })
        }
    }

    async fn exec_interactive(&self, invocation: &Invocation) -> Result<(), ExecError> {
        use std::process::Stdio;

        let program = invocation.program;
        tracing::debug!(%program, args = ?invocation.args, "running interactive command");

        let _busy = self.mark_busy();
        let status = invocation
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::Spawn { program, source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program,
                args: invocation.args.clone(),
                stderr: format!("exit code: {status}"),
            })
        }
    }
}
