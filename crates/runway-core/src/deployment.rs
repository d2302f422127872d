use crate::region::Region;
use crate::validate::{ProjectId, ServiceName};

/// The four parameters collected by the wizard.
///
/// Only constructed once every answer is known; a cancelled wizard never
/// produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub project_id: ProjectId,
    pub service_name: ServiceName,
    pub region: Region,
    pub allow_unauthenticated: bool,
}

impl DeploymentConfig {
    /// Label/value pairs shown to the operator before confirmation.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let access = if self.allow_unauthenticated {
            "Yes (Public)"
        } else {
            "No (Authenticated only)"
        };

        vec![
            ("Project ID", self.project_id.to_string()),
            ("Service Name", self.service_name.to_string()),
            ("Region", self.region.code().to_owned()),
            ("Public Access", access.to_owned()),
        ]
    }
}
