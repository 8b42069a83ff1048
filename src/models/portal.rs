//! The portal document: the single JSON value that holds all procurement state.

use crate::models::{bid::Bid, document::ComplianceDocument, rfp::Rfp, vendor::Vendor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters behind the display sequence numbers. Each holds the next number to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Next RFP number
    pub rfp: u32,
    /// Next work-authorization number
    pub wa: u32,
    /// Next bid number
    pub bid: u32,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            rfp: 1,
            wa: 1,
            bid: 1,
        }
    }
}

/// Everything the portal persists, read and written as one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalDocument {
    /// Known project names
    #[serde(default)]
    pub projects: Vec<String>,
    /// Known house model names
    #[serde(default)]
    pub models: Vec<String>,
    /// Known classification codes
    #[serde(default)]
    pub classification_codes: Vec<String>,
    /// Vendor directory
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Compliance documents keyed by vendor id
    #[serde(default)]
    pub documents: BTreeMap<String, Vec<ComplianceDocument>>,
    /// Requests for proposal
    #[serde(default)]
    pub rfps: Vec<Rfp>,
    /// Submitted bids
    #[serde(default)]
    pub bids: Vec<Bid>,
    /// Sequence counters
    #[serde(default)]
    pub counters: Counters,
}

impl PortalDocument {
    /// Finds a vendor by id.
    #[must_use]
    pub fn vendor(&self, vendor_id: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == vendor_id)
    }

    /// Finds an RFP by id.
    #[must_use]
    pub fn rfp(&self, rfp_id: &str) -> Option<&Rfp> {
        self.rfps.iter().find(|r| r.id == rfp_id)
    }

    /// Finds an RFP by id for mutation.
    pub fn rfp_mut(&mut self, rfp_id: &str) -> Option<&mut Rfp> {
        self.rfps.iter_mut().find(|r| r.id == rfp_id)
    }

    /// The bid a vendor submitted for an RFP, if any.
    #[must_use]
    pub fn vendor_bid(&self, rfp_id: &str, vendor_id: &str) -> Option<&Bid> {
        self.bids.iter().find(|b| b.matches(rfp_id, vendor_id))
    }
}
