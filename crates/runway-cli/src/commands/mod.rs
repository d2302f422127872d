mod login;
mod wizard;
mod workflow;

use runway_cloud::RealExecutor;
use std::future::Future;

pub use login::login;
pub use wizard::wizard;
pub use workflow::{Mode, Outcome};

/// Run `task` until it finishes or the operator presses Ctrl-C.
///
/// Ctrl-C while waiting on a prompt cancels. Ctrl-C while `executor` has a
/// command in flight only prints a notice: the command is always awaited.
async fn until_interrupted<F>(executor: &RealExecutor, task: F) -> anyhow::Result<Outcome>
where
    F: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
{
    let mut handle = tokio::spawn(task);

    loop {
        tokio::select! {
            joined = &mut handle => return joined?,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if executor.is_busy() {
                    eprintln!("\nWaiting for the running command to finish...");
                    continue;
                }
                tracing::debug!("interrupted while prompting");
                handle.abort();
                return Ok(Outcome::Cancelled);
            }
        }
    }
}
