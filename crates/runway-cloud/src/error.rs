use crate::executor::Program;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to launch {program} — is it installed and on PATH?")]
    Spawn {
        program: Program,
        source: std::io::Error,
    },

    #[error("{program} command failed: {args:?}\n{stderr}")]
    CommandFailed {
        program: Program,
        args: Vec<String>,
        stderr: String,
    },

    #[error("{program} did not finish within {}s", after.as_secs())]
    Timeout { program: Program, after: Duration },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: Program,
        source: std::string::FromUtf8Error,
    },
}
