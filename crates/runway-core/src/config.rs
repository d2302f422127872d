use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File name of the optional configuration looked up in the working directory.
pub const CONFIG_FILE: &str = "runway.toml";

/// runway.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunwayConfig {
    #[serde(default)]
    pub terraform: TerraformConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub gcloud: GcloudConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerraformConfig {
    /// Terraform working directory; `terraform.tfvars` is written here
    #[serde(default = "default_terraform_dir")]
    pub dir: PathBuf,
    /// Plan artifact produced by `terraform plan` and consumed by `apply`
    #[serde(default = "default_plan_file")]
    pub plan_file: String,
    /// Terraform output holding the deployed service URL
    #[serde(default = "default_url_output")]
    pub url_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Suggested answer for the service name prompt
    #[serde(default = "default_service_name")]
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcloudConfig {
    /// Upper bound for `gcloud projects describe`
    #[serde(default = "default_access_check_timeout_secs")]
    pub access_check_timeout_secs: u64,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            dir: default_terraform_dir(),
            plan_file: default_plan_file(),
            url_output: default_url_output(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_name: default_service_name(),
        }
    }
}

impl Default for GcloudConfig {
    fn default() -> Self {
        Self {
            access_check_timeout_secs: default_access_check_timeout_secs(),
        }
    }
}

impl TerraformConfig {
    /// Location of the generated variables file.
    pub fn tfvars_path(&self) -> PathBuf {
        self.dir.join("terraform.tfvars")
    }
}

impl GcloudConfig {
    pub fn access_check_timeout(&self) -> Duration {
        Duration::from_secs(self.access_check_timeout_secs)
    }
}

impl RunwayConfig {
    /// Load from runway.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), "loading runway config");
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_terraform_dir() -> PathBuf {
    PathBuf::from("terraform")
}

fn default_plan_file() -> String {
    "tfplan".to_owned()
}

fn default_url_output() -> String {
    "service_url".to_owned()
}

fn default_service_name() -> String {
    "datacommons-service".to_owned()
}

fn default_access_check_timeout_secs() -> u64 {
    10
}
