//! Format checks for operator-supplied identifiers.
//!
//! Both identifiers are parsed into newtypes, so a [`ProjectId`] or
//! [`ServiceName`] in hand is always well-formed.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static PROJECT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").expect("project id pattern compiles")
});

static SERVICE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]{0,61}[a-z0-9]$|^[a-z0-9]$")
        .expect("service name pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Invalid project ID format. Must be 6-30 characters, lowercase letters, \
         numbers, and hyphens only. Must start with a letter."
    )]
    ProjectId,

    #[error(
        "Invalid service name. Must be 1-63 characters, lowercase letters, \
         numbers, and hyphens. Must start and end with alphanumeric character."
    )]
    ServiceName,
}

/// GCP project identifier: 6-30 chars, lowercase letters, digits and hyphens,
/// starting with a letter and not ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectId {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if PROJECT_ID_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(ValidationError::ProjectId)
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cloud Run service name, used as a DNS label: 1-63 chars, lowercase
/// letters, digits and hyphens, alphanumeric at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceName {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if SERVICE_NAME_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(ValidationError::ServiceName)
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
