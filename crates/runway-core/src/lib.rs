//! Core types and configuration for runway.
//!
//! This crate defines the collected deployment parameters
//! ([`DeploymentConfig`]), their validators ([`ProjectId`], [`ServiceName`],
//! [`Region`]), the `terraform.tfvars` renderer, the `runway.toml` schema
//! ([`RunwayConfig`]), and shared error types.

pub mod config;
pub mod deployment;
pub mod error;
pub mod region;
pub mod tfvars;
pub mod validate;

pub use config::{GcloudConfig, RunwayConfig, ServiceConfig, TerraformConfig};
pub use deployment::DeploymentConfig;
pub use error::{Error, Result};
pub use region::Region;
pub use validate::{ProjectId, ServiceName, ValidationError};
