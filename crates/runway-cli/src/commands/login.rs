use super::workflow::{Outcome, ensure_login};
use crate::console::{Answer, Console};
use runway_cloud::{GcloudClient, RealExecutor};

/// Check gcloud credentials and offer `gcloud auth login` when missing.
pub async fn login() -> anyhow::Result<Outcome> {
    let executor = RealExecutor::new();
    let gcloud = GcloudClient::with_executor(executor.clone());

    super::until_interrupted(&executor, async move {
        let mut console = Console::stdio();
        match ensure_login(&mut console, &gcloud).await? {
            Answer::Answered(()) => Ok(Outcome::Authenticated),
            Answer::Cancelled => Ok(Outcome::Cancelled),
        }
    })
    .await
}
