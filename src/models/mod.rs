//! Domain records persisted in the portal document.
//!
//! All records are plain values: they are copied out of the store on load and
//! written back wholesale on save. Serialized field names are camelCase.

/// Bids and the vendor submission form
pub mod bid;
/// Vendor compliance documents
pub mod document;
/// Line items and item sets
pub mod items;
/// The portal document and its counters
pub mod portal;
/// Requests for proposal
pub mod rfp;
/// Vendor directory records
pub mod vendor;

pub use bid::{Bid, BidForm, BidStatus};
pub use document::{ComplianceDocument, DocumentForm, DocumentStatus, DocumentType, FileMeta};
pub use items::{Category, ItemSet, LineRef, Named, PricedItem, RfpItem};
pub use portal::{Counters, PortalDocument};
pub use rfp::{Rfp, RfpForm};
pub use vendor::{Vendor, VendorForm, VendorStatus};
