//! Vendor bids against an RFP.

use crate::models::items::{ItemSet, PricedItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bid status. Only submission is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    /// Submitted by the vendor
    #[default]
    Submitted,
}

/// A vendor's priced response to an RFP. One per (rfp, vendor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    /// Bid id (`bid-3`; older data may carry `bid-<timestamp>`)
    pub id: String,
    /// RFP this bid answers
    pub rfp_id: String,
    /// Submitting vendor
    pub vendor_id: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Status
    #[serde(default)]
    pub status: BidStatus,
    /// Priced lines
    #[serde(default)]
    pub items: ItemSet<PricedItem>,
}

impl Bid {
    /// True when this bid belongs to the (rfp, vendor) pair.
    #[must_use]
    pub fn matches(&self, rfp_id: &str, vendor_id: &str) -> bool {
        self.rfp_id == rfp_id && self.vendor_id == vendor_id
    }
}

/// A bid as entered on the vendor submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct BidForm {
    /// RFP being answered
    pub rfp_id: String,
    /// Submitting vendor
    pub vendor_id: String,
    /// Priced lines
    pub items: ItemSet<PricedItem>,
    /// Whether the vendor ticked the terms acknowledgement
    pub terms_acknowledged: bool,
}
