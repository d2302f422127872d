use crate::console::{Answer, Console};
use crate::session::Session;
use runway_cloud::{CommandExecutor, GcloudClient, TerraformClient};
use runway_core::{DeploymentConfig, ProjectId, Region, RunwayConfig, ServiceName, tfvars};
use std::io::Write;
use tokio::io::AsyncBufRead;
use std::path::PathBuf;

/// How far the wizard goes after writing `terraform.tfvars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop after the variables file and print the manual next steps.
    InteractiveOnly,
    /// Also authenticate and run terraform init / plan / apply.
    FullyAutomated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Configured {
        tfvars: PathBuf,
    },
    Deployed {
        tfvars: PathBuf,
        url: Option<String>,
    },
    Authenticated,
    Cancelled,
}

/// The configuration wizard: collect, validate, materialize, and optionally
/// deploy.
pub(crate) struct Wizard<'a, R, W, E: CommandExecutor> {
    console: &'a mut Console<R, W>,
    gcloud: &'a GcloudClient<E>,
    terraform: &'a TerraformClient<E>,
    config: &'a RunwayConfig,
}

impl<'a, R: AsyncBufRead + Unpin, W: Write, E: CommandExecutor> Wizard<'a, R, W, E> {
    pub(crate) fn new(
        console: &'a mut Console<R, W>,
        gcloud: &'a GcloudClient<E>,
        terraform: &'a TerraformClient<E>,
        config: &'a RunwayConfig,
    ) -> Self {
        Self {
            console,
            gcloud,
            terraform,
            config,
        }
    }

    pub(crate) async fn run(&mut self, mode: Mode, session: &Session) -> anyhow::Result<Outcome> {
        let Answer::Answered(deployment) = self.collect(session).await? else {
            return Ok(Outcome::Cancelled);
        };

        let path = tfvars::write(&deployment, &self.config.terraform.tfvars_path())?;
        self.console.blank()?;
        self.console
            .success(&format!("Configuration saved: {}", path.display()))?;

        match mode {
            Mode::InteractiveOnly => {
                self.print_next_steps()?;
                Ok(Outcome::Configured { tfvars: path })
            }
            Mode::FullyAutomated => self.deploy(&deployment, path).await,
        }
    }

    /// Prompt for the four parameters. Nothing touches disk here.
    async fn collect(&mut self, session: &Session) -> anyhow::Result<Answer<DeploymentConfig>> {
        // ── 1. Project ──
        self.console.step(1, "GCP Project Configuration")?;
        if session.cloud_shell {
            self.console
                .note("Cloud Shell session detected; gcloud credentials come from the session.")?;
        }

        let Answer::Answered(project_id) = self
            .console
            .text(
                "Enter your GCP Project ID",
                session.detected_project.as_deref(),
                |s| s.parse::<ProjectId>(),
            )
            .await?
        else {
            return Ok(Answer::Cancelled);
        };

        self.console.note("Verifying project access...")?;
        if !self.gcloud.verify_project_access(project_id.as_str()).await {
            self.console
                .failure(&format!("Cannot access project: {project_id}"))?;
            self.console
                .note("Ensure project ID is correct and you have necessary permissions.")?;
            anyhow::bail!("cannot access project {project_id}");
        }
        self.console
            .success(&format!("Project verified: {project_id}"))?;

        // ── 2. Service ──
        self.console.step(2, "Service Configuration")?;
        let Answer::Answered(service_name) = self
            .console
            .text(
                "Enter service name",
                Some(self.config.service.default_name.as_str()),
                |s| s.parse::<ServiceName>(),
            )
            .await?
        else {
            return Ok(Answer::Cancelled);
        };
        self.console
            .success(&format!("Service name: {service_name}"))?;

        // ── 3. Region ──
        self.console.step(3, "Deployment Region")?;
        let Answer::Answered(region) = self
            .console
            .select("Select your deployment region", &Region::ALL)
            .await?
        else {
            return Ok(Answer::Cancelled);
        };
        self.console.success(&format!("Region: {region}"))?;

        // ── 4. Access ──
        self.console.step(4, "Access Control")?;
        let Answer::Answered(allow_unauthenticated) = self
            .console
            .confirm("Allow public (unauthenticated) access?", true)
            .await?
        else {
            return Ok(Answer::Cancelled);
        };
        self.console.success(if allow_unauthenticated {
            "Public access enabled"
        } else {
            "Authenticated access only"
        })?;

        let deployment = DeploymentConfig {
            project_id,
            service_name,
            region,
            allow_unauthenticated,
        };

        self.console
            .summary("Configuration Summary", &deployment.summary_rows())?;
        self.console.blank()?;

        match self
            .console
            .confirm("Proceed with this configuration?", true)
            .await?
        {
            Answer::Answered(true) => Ok(Answer::Answered(deployment)),
            Answer::Answered(false) | Answer::Cancelled => Ok(Answer::Cancelled),
        }
    }

    async fn deploy(
        &mut self,
        deployment: &DeploymentConfig,
        tfvars: PathBuf,
    ) -> anyhow::Result<Outcome> {
        // ── 5. Authentication ──
        self.console.step(5, "Authentication")?;
        if let Answer::Cancelled = ensure_login(&mut *self.console, self.gcloud).await? {
            return Ok(Outcome::Cancelled);
        }

        let env = self
            .gcloud
            .bootstrap_auth(deployment.project_id.as_str())
            .await;
        if env.is_empty() {
            self.console.note(
                "Continuing without an exported access token; Terraform will use its own credentials.",
            )?;
        } else {
            self.console.success("Access token ready for Terraform")?;
        }

        // ── 6. Infrastructure ──
        self.console.step(6, "Infrastructure Deployment")?;

        self.console.note("Running terraform init...")?;
        self.terraform.init(&env).await?;
        self.console.success("Terraform initialized")?;

        self.console.note("Running terraform plan...")?;
        let plan = self.terraform.plan(&env).await?;
        self.console.blank()?;
        for line in plan.lines() {
            self.console.line(line)?;
        }
        self.console.blank()?;

        let Answer::Answered(true) = self.console.confirm("Apply this plan?", true).await? else {
            return Ok(Outcome::Cancelled);
        };

        self.console.note("Running terraform apply...")?;
        self.terraform.apply(&env).await?;
        self.console.success("Infrastructure applied")?;

        let url = match self
            .terraform
            .output(&env, &self.config.terraform.url_output)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "could not read service URL");
                None
            }
        };

        self.console.blank()?;
        match &url {
            Some(url) => self.console.success(&format!("Service URL: {url}"))?,
            None => self
                .console
                .note("Deployment complete; the service URL could not be read.")?,
        }

        Ok(Outcome::Deployed { tfvars, url })
    }

    fn print_next_steps(&mut self) -> std::io::Result<()> {
        let dir = self.config.terraform.dir.display();

        self.console.blank()?;
        self.console.line("Next Steps:")?;
        self.console.blank()?;
        self.console
            .line(&format!("  1. Initialize Terraform:  cd {dir} && terraform init"))?;
        self.console.line("  2. Review changes:        terraform plan")?;
        self.console.line("  3. Deploy infrastructure: terraform apply")?;
        self.console.blank()
    }
}

/// Make sure gcloud can mint tokens, offering `gcloud auth login` if not.
///
/// Declining the offer cancels; a failed login is an error.
pub(crate) async fn ensure_login<R: AsyncBufRead + Unpin, W: Write, E: CommandExecutor>(
    console: &mut Console<R, W>,
    gcloud: &GcloudClient<E>,
) -> anyhow::Result<Answer<()>> {
    if gcloud.has_credentials().await {
        console.success("gcloud credentials found")?;
        return Ok(Answer::Answered(()));
    }

    let Answer::Answered(true) = console
        .confirm(
            "No active gcloud credentials found. Run 'gcloud auth login' now?",
            true,
        )
        .await?
    else {
        return Ok(Answer::Cancelled);
    };

    if let Err(e) = gcloud.login().await {
        console.failure("gcloud login failed")?;
        return Err(e.into());
    }
    console.success("Logged in to gcloud")?;

    Ok(Answer::Answered(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use runway_cloud::{ExecError, Invocation, Program, TOKEN_ENV_VAR};
    use secrecy::ExposeSecret;
    use std::io::Cursor;
    use tempfile::TempDir;

    mock! {
        Executor {}

        impl CommandExecutor for Executor {
            async fn exec(&self, invocation: &Invocation) -> Result<String, ExecError>;
            async fn exec_interactive(&self, invocation: &Invocation) -> Result<(), ExecError>;
        }
    }

    type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

    fn console(input: &str) -> TestConsole {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn config_in(tmp: &TempDir) -> RunwayConfig {
        let mut config = RunwayConfig::default();
        config.terraform.dir = tmp.path().join("terraform");
        config
    }

    fn failed(program: Program, stderr: &str) -> ExecError {
        ExecError::CommandFailed {
            program,
            args: vec![],
            stderr: stderr.to_owned(),
        }
    }

    /// gcloud that can see the project and has credentials.
    fn gcloud_ok() -> MockExecutor {
        let mut mock = MockExecutor::new();
        mock.expect_exec().returning(|inv| {
            if inv.starts_with(&["auth", "print-access-token"]) {
                Ok("ya29.token\n".to_owned())
            } else {
                Ok(String::new())
            }
        });
        mock
    }

    /// Terraform that must not be invoked at all.
    fn terraform_unused() -> MockExecutor {
        let mut mock = MockExecutor::new();
        mock.expect_exec().never();
        mock
    }

    fn expect_terraform(mock: &mut MockExecutor, verb: &'static str, result: Result<&'static str, &'static str>) {
        mock.expect_exec()
            .withf(move |inv| inv.program == Program::Terraform && inv.starts_with(&[verb]))
            .times(1)
            .returning(move |_| match result {
                Ok(out) => Ok(out.to_owned()),
                Err(stderr) => Err(failed(Program::Terraform, stderr)),
            });
    }

    async fn run_wizard(
        input: &str,
        mode: Mode,
        session: &Session,
        gcloud: MockExecutor,
        terraform: MockExecutor,
        config: &RunwayConfig,
    ) -> (anyhow::Result<Outcome>, String) {
        let mut console = console(input);
        let gcloud = GcloudClient::with_executor(gcloud);
        let terraform = TerraformClient::with_executor(terraform, &config.terraform);

        let outcome = Wizard::new(&mut console, &gcloud, &terraform, config)
            .run(mode, session)
            .await;

        let output = String::from_utf8(console.into_output()).unwrap();
        (outcome, output)
    }

    // ── Interactive-only ──

    #[tokio::test]
    async fn configure_writes_tfvars_and_prints_next_steps() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        // project, default service name, region 2, default public, proceed
        let (outcome, output) = run_wizard(
            "my-project-123\n\n2\n\n\n",
            Mode::InteractiveOnly,
            &Session::default(),
            gcloud_ok(),
            terraform_unused(),
            &config,
        )
        .await;

        let path = config.terraform.tfvars_path();
        assert_eq!(outcome.unwrap(), Outcome::Configured { tfvars: path.clone() });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_id = \"my-project-123\""));
        assert!(content.contains("service_name = \"datacommons-service\""));
        assert!(content.contains("region = \"us-east1\""));
        assert!(content.contains("allow_unauthenticated = true"));

        assert!(output.contains("Project verified: my-project-123"));
        assert!(output.contains("Next Steps:"));
        assert!(output.contains("terraform init"));
    }

    #[tokio::test]
    async fn invalid_project_id_is_reasked() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let (outcome, output) = run_wizard(
            "My-Project\nab\nmy-project-123\nweb-api\n9\nn\ny\n",
            Mode::InteractiveOnly,
            &Session::default(),
            gcloud_ok(),
            terraform_unused(),
            &config,
        )
        .await;

        assert!(matches!(outcome.unwrap(), Outcome::Configured { .. }));
        assert_eq!(output.matches("Invalid project ID format.").count(), 2);

        let content = std::fs::read_to_string(config.terraform.tfvars_path()).unwrap();
        assert!(content.contains("service_name = \"web-api\""));
        assert!(content.contains("region = \"asia-southeast1\""));
        assert!(content.contains("allow_unauthenticated = false"));
    }

    #[tokio::test]
    async fn detected_project_prefills_prompt() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let session = Session {
            detected_project: Some("shell-project".to_owned()),
            cloud_shell: true,
        };

        let mut gcloud = MockExecutor::new();
        gcloud
            .expect_exec()
            .withf(|inv| inv.starts_with(&["projects", "describe", "shell-project"]))
            .times(1)
            .returning(|_| Ok(String::new()));

        let (outcome, output) = run_wizard(
            "\n\n1\n\n\n",
            Mode::InteractiveOnly,
            &session,
            gcloud,
            terraform_unused(),
            &config,
        )
        .await;

        assert!(matches!(outcome.unwrap(), Outcome::Configured { .. }));
        assert!(output.contains("[shell-project]"));
        assert!(output.contains("Cloud Shell session detected"));
    }

    #[tokio::test]
    async fn inaccessible_project_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut gcloud = MockExecutor::new();
        gcloud
            .expect_exec()
            .returning(|_| Err(failed(Program::Gcloud, "NOT_FOUND")));

        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\n\n",
            Mode::InteractiveOnly,
            &Session::default(),
            gcloud,
            terraform_unused(),
            &config,
        )
        .await;

        let err = outcome.unwrap_err().to_string();
        assert!(err.contains("my-project-123"), "got: {err}");
        assert!(output.contains("Cannot access project: my-project-123"));
        assert!(!config.terraform.tfvars_path().exists());
    }

    #[tokio::test]
    async fn end_of_input_cancels_before_writing() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let (outcome, _) = run_wizard(
            "my-project-123\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform_unused(),
            &config,
        )
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(!config.terraform.dir.exists());
    }

    #[tokio::test]
    async fn empty_project_answer_cancels_without_access_check() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut gcloud = MockExecutor::new();
        gcloud.expect_exec().never();

        let (outcome, _) = run_wizard(
            "\n",
            Mode::InteractiveOnly,
            &Session::default(),
            gcloud,
            terraform_unused(),
            &config,
        )
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn declining_summary_cancels_before_writing() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\nn\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform_unused(),
            &config,
        )
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(output.contains("Configuration Summary"));
        assert!(!config.terraform.tfvars_path().exists());
    }

    // ── Fully automated ──

    #[tokio::test]
    async fn deploy_runs_init_plan_apply_with_token() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut terraform = MockExecutor::new();
        let mut seq = mockall::Sequence::new();
        for verb in ["init", "plan", "apply"] {
            terraform
                .expect_exec()
                .withf(move |inv| {
                    inv.starts_with(&[verb])
                        && inv
                            .env
                            .get(TOKEN_ENV_VAR)
                            .is_some_and(|t| t.expose_secret() == "ya29.token")
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(format!("{verb} ok\n")));
        }
        terraform
            .expect_exec()
            .withf(|inv| inv.starts_with(&["output", "-json", "service_url"]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("\"https://my-svc.a.run.app\"\n".to_owned()));

        // project, service, region, public, proceed, apply
        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\n\n\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform,
            &config,
        )
        .await;

        assert_eq!(
            outcome.unwrap(),
            Outcome::Deployed {
                tfvars: config.terraform.tfvars_path(),
                url: Some("https://my-svc.a.run.app".to_owned()),
            }
        );
        assert!(output.contains("plan ok"));
        assert!(output.contains("Service URL: https://my-svc.a.run.app"));
        assert!(!output.contains("ya29.token"));
    }

    #[tokio::test]
    async fn init_failure_skips_plan_and_apply() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut terraform = MockExecutor::new();
        expect_terraform(&mut terraform, "init", Err("Error: Invalid provider configuration"));
        terraform
            .expect_exec()
            .withf(|inv| inv.starts_with(&["plan"]) || inv.starts_with(&["apply"]))
            .never();

        let (outcome, _) = run_wizard(
            "my-project-123\n\n1\n\n\n\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform,
            &config,
        )
        .await;

        let err = format!("{:#}", outcome.unwrap_err());
        assert!(err.contains("terraform init failed"), "got: {err}");
        assert!(err.contains("Invalid provider configuration"), "got: {err}");
    }

    #[tokio::test]
    async fn plan_failure_skips_apply() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut terraform = MockExecutor::new();
        expect_terraform(&mut terraform, "init", Ok(""));
        expect_terraform(&mut terraform, "plan", Err("Error: No value for required variable"));
        terraform
            .expect_exec()
            .withf(|inv| inv.starts_with(&["apply"]))
            .never();

        let (outcome, _) = run_wizard(
            "my-project-123\n\n1\n\n\n\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform,
            &config,
        )
        .await;

        let err = format!("{:#}", outcome.unwrap_err());
        assert!(err.contains("terraform plan failed"), "got: {err}");
    }

    #[tokio::test]
    async fn declining_apply_cancels() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut terraform = MockExecutor::new();
        expect_terraform(&mut terraform, "init", Ok(""));
        expect_terraform(&mut terraform, "plan", Ok("Plan: 2 to add"));
        terraform
            .expect_exec()
            .withf(|inv| inv.starts_with(&["apply"]))
            .never();

        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\n\nn\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform,
            &config,
        )
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(output.contains("Plan: 2 to add"));
    }

    #[tokio::test]
    async fn missing_url_output_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut terraform = MockExecutor::new();
        expect_terraform(&mut terraform, "init", Ok(""));
        expect_terraform(&mut terraform, "plan", Ok(""));
        expect_terraform(&mut terraform, "apply", Ok("Apply complete!"));
        expect_terraform(&mut terraform, "output", Err("Error: Output \"service_url\" not found"));

        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\n\n\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud_ok(),
            terraform,
            &config,
        )
        .await;

        assert!(matches!(outcome.unwrap(), Outcome::Deployed { url: None, .. }));
        assert!(output.contains("service URL could not be read"));
    }

    #[tokio::test]
    async fn token_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        // Access check passes, every auth call fails; login is accepted.
        let mut gcloud = MockExecutor::new();
        gcloud.expect_exec().returning(|inv| {
            if inv.starts_with(&["projects", "describe"]) {
                Ok(String::new())
            } else {
                Err(failed(Program::Gcloud, "no credentials"))
            }
        });
        gcloud
            .expect_exec_interactive()
            .withf(|inv| inv.starts_with(&["auth", "login"]))
            .times(1)
            .returning(|_| Ok(()));

        let mut terraform = MockExecutor::new();
        terraform
            .expect_exec()
            .withf(|inv| inv.env.is_empty())
            .returning(|inv| {
                if inv.starts_with(&["output"]) {
                    Ok("\"https://svc.a.run.app\"".to_owned())
                } else {
                    Ok(String::new())
                }
            });

        // project, service, region, public, proceed, login, apply
        let (outcome, output) = run_wizard(
            "my-project-123\n\n1\n\n\n\n\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud,
            terraform,
            &config,
        )
        .await;

        assert!(matches!(outcome.unwrap(), Outcome::Deployed { url: Some(_), .. }));
        assert!(output.contains("Continuing without an exported access token"));
    }

    // ── Login ──

    #[tokio::test]
    async fn declining_login_cancels_before_terraform() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let mut gcloud = MockExecutor::new();
        gcloud.expect_exec().returning(|inv| {
            if inv.starts_with(&["projects", "describe"]) {
                Ok(String::new())
            } else {
                Err(failed(Program::Gcloud, "no credentials"))
            }
        });
        gcloud.expect_exec_interactive().never();

        let (outcome, _) = run_wizard(
            "my-project-123\n\n1\n\n\nn\n",
            Mode::FullyAutomated,
            &Session::default(),
            gcloud,
            terraform_unused(),
            &config,
        )
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn failed_login_is_an_error() {
        let mut gcloud = MockExecutor::new();
        gcloud
            .expect_exec()
            .returning(|_| Err(failed(Program::Gcloud, "no credentials")));
        gcloud
            .expect_exec_interactive()
            .returning(|_| Err(failed(Program::Gcloud, "exit code: exit status: 1")));
        let gcloud = GcloudClient::with_executor(gcloud);

        let mut console = console("y\n");
        let result = ensure_login(&mut console, &gcloud).await;

        assert!(result.is_err());
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("gcloud login failed"));
    }

    #[tokio::test]
    async fn existing_credentials_skip_login() {
        let mut gcloud = gcloud_ok();
        gcloud.expect_exec_interactive().never();
        let gcloud = GcloudClient::with_executor(gcloud);

        let mut console = console("");
        let result = ensure_login(&mut console, &gcloud).await.unwrap();

        assert_eq!(result, Answer::Answered(()));
    }
}
