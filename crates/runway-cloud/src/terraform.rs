use crate::error::ExecError;
use crate::executor::{CommandEnv, CommandExecutor, Invocation, Program, RealExecutor};
use runway_core::TerraformConfig;
use std::path::{Path, PathBuf};

/// Terraform lifecycle commands run against one working directory.
pub struct TerraformClient<E: CommandExecutor = RealExecutor> {
    executor: E,
    dir: PathBuf,
    plan_file: String,
}

impl TerraformClient<RealExecutor> {
    pub fn new(config: &TerraformConfig) -> Self {
        Self::with_executor(RealExecutor::new(), config)
    }
}

impl<E: CommandExecutor> TerraformClient<E> {
    pub fn with_executor(executor: E, config: &TerraformConfig) -> Self {
        Self {
            executor,
            dir: config.dir.clone(),
            plan_file: config.plan_file.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `terraform init`; safe to repeat, upgrades providers.
    pub async fn init(&self, env: &CommandEnv) -> Result<(), TerraformError> {
        self.run(env, ["init", "-input=false", "-upgrade"])
            .await
            .map_err(|e| TerraformError::Init { source: e })?;

        Ok(())
    }

    /// `terraform plan` into the plan artifact. Returns the plan's stdout.
    pub async fn plan(&self, env: &CommandEnv) -> Result<String, TerraformError> {
        let out = format!("-out={}", self.plan_file);
        self.run(env, ["plan", "-input=false", &out])
            .await
            .map_err(|e| TerraformError::Plan { source: e })
    }

    /// Apply the plan artifact written by [`plan`](Self::plan).
    pub async fn apply(&self, env: &CommandEnv) -> Result<String, TerraformError> {
        self.run(env, ["apply", "-input=false", &self.plan_file])
            .await
            .map_err(|e| TerraformError::Apply { source: e })
    }

    /// Read one output value.
    ///
    /// Strings are returned unquoted; any other JSON value is returned in
    /// its JSON form.
    pub async fn output(&self, env: &CommandEnv, name: &str) -> Result<String, TerraformError> {
        let raw = self
            .run(env, ["output", "-json", name])
            .await
            .map_err(|e| TerraformError::Output {
                name: name.to_owned(),
                source: e,
            })?;

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| TerraformError::OutputFormat {
                name: name.to_owned(),
                source: e,
            })?;

        Ok(match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    async fn run<const N: usize>(
        &self,
        env: &CommandEnv,
        args: [&str; N],
    ) -> Result<String, ExecError> {
        let invocation = Invocation::new(Program::Terraform, args)
            .in_dir(&self.dir)
            .with_env(env);
        self.executor.exec(&invocation).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TerraformError {
    #[error("terraform init failed")]
    Init { source: ExecError },

    #[error("terraform plan failed")]
    Plan { source: ExecError },

    #[error("terraform apply failed")]
    Apply { source: ExecError },

    #[error("failed to read terraform output '{name}'")]
    Output { name: String, source: ExecError },

    #[error("terraform output '{name}' is not valid JSON")]
    OutputFormat {
        name: String,
        source: serde_json::Error,
    },
}
