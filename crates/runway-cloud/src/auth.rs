//! Access tokens minted by gcloud and handed to Terraform.

use crate::error::ExecError;
use crate::executor::CommandEnv;
use secrecy::SecretString;

/// Variable the Terraform Google provider reads an OAuth access token from.
pub const TOKEN_ENV_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Short-lived credential from `gcloud auth print-access-token`.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Parse gcloud output; `None` when it printed nothing usable.
    pub fn from_output(output: &str) -> Option<Self> {
        let token = output.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(SecretString::from(token.to_owned())))
        }
    }

    /// Environment for child processes that should act with this token.
    pub fn into_env(self) -> CommandEnv {
        let mut env = CommandEnv::new();
        env.set(TOKEN_ENV_VAR, self.0);
        env
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to set active gcloud project")]
    SetProject { source: ExecError },

    #[error("failed to obtain an access token — run: gcloud auth login")]
    Token { source: ExecError },

    #[error("gcloud printed an empty access token")]
    EmptyToken,

    #[error("gcloud login failed")]
    Login { source: ExecError },
}
