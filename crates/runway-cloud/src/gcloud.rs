use crate::auth::{AccessToken, AuthError};
use crate::executor::{CommandEnv, CommandExecutor, Invocation, Program, RealExecutor};
use std::time::Duration;

/// Default bound on the project-access check.
pub const ACCESS_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// gcloud operations, parameterized over the executor for testability.
pub struct GcloudClient<E: CommandExecutor = RealExecutor> {
    executor: E,
    access_check_timeout: Duration,
}

impl GcloudClient<RealExecutor> {
    pub fn new() -> Self {
        Self::with_executor(RealExecutor::new())
    }
}

impl Default for GcloudClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GcloudClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            access_check_timeout: ACCESS_CHECK_TIMEOUT,
        }
    }

    pub fn access_check_timeout(mut self, timeout: Duration) -> Self {
        self.access_check_timeout = timeout;
        self
    }

    // ── Project access ──

    /// Whether `gcloud projects describe` succeeds for `project_id` within
    /// the access-check timeout.
    ///
    /// A missing project, missing permission, missing gcloud and a timeout
    /// all read as `false`; the cause is only logged.
    pub async fn verify_project_access(&self, project_id: &str) -> bool {
        let invocation = Invocation::new(Program::Gcloud, ["projects", "describe", project_id])
            .with_timeout(self.access_check_timeout);

        match self.executor.exec(&invocation).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(project_id, error = %e, "project access check failed");
                false
            }
        }
    }

    // ── Authentication ──

    pub async fn set_project(&self, project_id: &str) -> Result<(), AuthError> {
        self.executor
            .exec(&Invocation::new(
                Program::Gcloud,
                ["config", "set", "project", project_id],
            ))
            .await
            .map_err(|e| AuthError::SetProject { source: e })?;

        Ok(())
    }

    pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let output = self
            .executor
            .exec(&Invocation::new(
                Program::Gcloud,
                ["auth", "print-access-token"],
            ))
            .await
            .map_err(|e| AuthError::Token { source: e })?;

        AccessToken::from_output(&output).ok_or(AuthError::EmptyToken)
    }

    /// Whether gcloud can mint an access token right now.
    pub async fn has_credentials(&self) -> bool {
        match self.access_token().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "no usable gcloud credentials");
                false
            }
        }
    }

    /// Run the browser-based `gcloud auth login` flow on the operator's
    /// terminal.
    pub async fn login(&self) -> Result<(), AuthError> {
        self.executor
            .exec_interactive(&Invocation::new(Program::Gcloud, ["auth", "login"]))
            .await
            .map_err(|e| AuthError::Login { source: e })
    }

    /// Point gcloud at `project_id` and export an access token for
    /// Terraform.
    ///
    /// Best effort: failures are logged and an empty environment is
    /// returned, leaving later commands to fail on their own if they
    /// really need credentials.
    pub async fn bootstrap_auth(&self, project_id: &str) -> CommandEnv {
        if let Err(e) = self.set_project(project_id).await {
            tracing::warn!(project_id, error = %e, "could not set active gcloud project");
        }

        match self.access_token().await {
            Ok(token) => {
                tracing::debug!("access token obtained");
                token.into_env()
            }
            Err(e) => {
                tracing::warn!(error = %e, "continuing without an access token");
                CommandEnv::new()
            }
        }
    }
}
