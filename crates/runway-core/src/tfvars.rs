//! `terraform.tfvars` generation.
//!
//! The file is an output artifact only; runway never reads it back.

use crate::deployment::DeploymentConfig;
use std::path::{Path, PathBuf};

/// Container image deployed until the operator publishes their own.
pub const CONTAINER_IMAGE: &str = "gcr.io/cloudrun/hello";

/// Render the variables file for `config`.
pub fn render(config: &DeploymentConfig) -> String {
    format!(
        "# Generated configuration for Cloud Run deployment
# Generated by: runway

project_id = \"{project_id}\"
service_name = \"{service_name}\"
region = \"{region}\"
allow_unauthenticated = {allow_unauthenticated}
container_image = \"{image}\"
",
        project_id = config.project_id,
        service_name = config.service_name,
        region = config.region.code(),
        allow_unauthenticated = config.allow_unauthenticated,
        image = CONTAINER_IMAGE,
    )
}

/// Write the rendered variables to `path`, creating the parent directory
/// if needed. An existing file is overwritten.
pub fn write(config: &DeploymentConfig, path: &Path) -> crate::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| crate::Error::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, render(config)).map_err(|e| crate::Error::TfvarsWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "terraform variables written");
    Ok(path.to_path_buf())
}
