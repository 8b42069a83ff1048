//! Vendor directory records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a vendor. Vendors are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    /// Eligible for invitations
    #[default]
    Active,
    /// Retired from the directory
    Inactive,
    /// Awaiting onboarding
    Pending,
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// A vendor (trade contractor) in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Unique identifier (`v1`, `v-k3j9x0a`, ...)
    pub id: String,
    /// Company name
    pub name: String,
    /// Trade (e.g., "Concrete")
    #[serde(default)]
    pub trade: String,
    /// Home city
    #[serde(default)]
    pub city: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Contact person
    #[serde(default)]
    pub contact: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Classification codes the vendor is qualified for
    #[serde(default)]
    pub classification_codes: Vec<String>,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Directory status
    #[serde(default)]
    pub status: VendorStatus,
    /// Rating out of 5
    #[serde(default)]
    pub rating: f64,
}

/// Fields collected by the vendor add/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorForm {
    /// Company name (required)
    pub name: String,
    /// Trade (required)
    pub trade: String,
    /// Home city
    pub city: String,
    /// Contact person (required)
    pub contact: String,
    /// Contact email (required)
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Classification codes
    pub classification_codes: Vec<String>,
    /// Notes
    pub notes: String,
    /// Initial status
    pub status: VendorStatus,
}
