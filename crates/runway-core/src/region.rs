use std::fmt;

/// Cloud Run regions offered by the wizard.
///
/// The list is closed: the region prompt only ever yields one of these,
/// so free text can never reach `terraform.tfvars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    UsCentral1,
    UsEast1,
    UsEast4,
    UsWest1,
    EuropeWest1,
    EuropeWest4,
    AsiaEast1,
    AsiaNortheast1,
    AsiaSoutheast1,
}

impl Region {
    /// All regions, in the order they are offered.
    pub const ALL: [Region; 9] = [
        Region::UsCentral1,
        Region::UsEast1,
        Region::UsEast4,
        Region::UsWest1,
        Region::EuropeWest1,
        Region::EuropeWest4,
        Region::AsiaEast1,
        Region::AsiaNortheast1,
        Region::AsiaSoutheast1,
    ];

    /// Region code as understood by gcloud and Terraform.
    pub fn code(self) -> &'static str {
        match self {
            Region::UsCentral1 => "us-central1",
            Region::UsEast1 => "us-east1",
            Region::UsEast4 => "us-east4",
            Region::UsWest1 => "us-west1",
            Region::EuropeWest1 => "europe-west1",
            Region::EuropeWest4 => "europe-west4",
            Region::AsiaEast1 => "asia-east1",
            Region::AsiaNortheast1 => "asia-northeast1",
            Region::AsiaSoutheast1 => "asia-southeast1",
        }
    }

    pub fn location(self) -> &'static str {
        match self {
            Region::UsCentral1 => "Iowa, USA",
            Region::UsEast1 => "South Carolina, USA",
            Region::UsEast4 => "Virginia, USA",
            Region::UsWest1 => "Oregon, USA",
            Region::EuropeWest1 => "Belgium",
            Region::EuropeWest4 => "Netherlands",
            Region::AsiaEast1 => "Taiwan",
            Region::AsiaNortheast1 => "Tokyo, Japan",
            Region::AsiaSoutheast1 => "Singapore",
        }
    }
}

/// Renders the choice label, e.g. `us-central1 (Iowa, USA)`.
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.location())
    }
}
