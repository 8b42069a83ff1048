//! Request-for-proposal records.

use crate::models::items::{ItemSet, RfpItem};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A request for proposal sent to invited vendors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfp {
    /// Sequence id (`RFP-001`)
    pub id: String,
    /// Display title, defaults to the id
    pub title: String,
    /// Projects the RFP covers
    #[serde(default)]
    pub projects: Vec<String>,
    /// House models the RFP covers
    #[serde(default)]
    pub models: Vec<String>,
    /// Bid due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Requested lines
    #[serde(default)]
    pub items: ItemSet<RfpItem>,
    /// Vendors invited to bid
    #[serde(default)]
    pub invited_vendor_ids: Vec<String>,
    /// Vendor the tender was awarded to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded_to: Option<String>,
    /// When the award was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded_at: Option<DateTime<Utc>>,
    /// Work-authorization number once generated (`WA-002`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_authorization: Option<String>,
}

impl Rfp {
    /// True when `vendor_id` is on the invitation list.
    #[must_use]
    pub fn is_invited(&self, vendor_id: &str) -> bool {
        self.invited_vendor_ids.iter().any(|id| id == vendor_id)
    }
}

/// Fields collected by the RFP create/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfpForm {
    /// Title; blank means "use the id"
    pub title: String,
    /// Selected projects
    pub projects: Vec<String>,
    /// Selected house models
    pub models: Vec<String>,
    /// Due date
    pub due_date: Option<NaiveDate>,
    /// Selected lines
    pub items: ItemSet<RfpItem>,
    /// Invited vendors
    pub invited_vendor_ids: Vec<String>,
}
