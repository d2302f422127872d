pub mod auth;
pub mod error;
pub mod executor;
pub mod gcloud;
pub mod terraform;

pub use auth::{AccessToken, AuthError, TOKEN_ENV_VAR};
pub use error::ExecError;
pub use executor::{CommandEnv, CommandExecutor, Invocation, Program, RealExecutor};
pub use gcloud::GcloudClient;
pub use terraform::{TerraformClient, TerraformError};
