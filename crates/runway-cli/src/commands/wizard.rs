use super::workflow::{Mode, Outcome, Wizard};
use crate::console::Console;
use crate::session::Session;
use runway_cloud::{GcloudClient, RealExecutor, TerraformClient};
use runway_core::RunwayConfig;
use std::path::Path;

/// Run the configuration wizard in the given mode.
pub async fn wizard(mode: Mode) -> anyhow::Result<Outcome> {
    let config = RunwayConfig::load(Path::new("."))?;
    let session = Session::from_env();
    tracing::debug!(?mode, ?session, "starting wizard");

    let executor = RealExecutor::new();
    let gcloud = GcloudClient::with_executor(executor.clone())
        .access_check_timeout(config.gcloud.access_check_timeout());
    let terraform = TerraformClient::with_executor(executor.clone(), &config.terraform);

    super::until_interrupted(&executor, async move {
        let mut console = Console::stdio();
        Wizard::new(&mut console, &gcloud, &terraform, &config)
            .run(mode, &session)
            .await
    })
    .await
}
