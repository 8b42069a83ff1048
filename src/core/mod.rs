//! Core business logic - framework-agnostic operations on the portal document.
//!
//! Every function takes a [`store::Store`] and works on whole-document
//! snapshots. Mutations go through `Store::update`, so a failed operation
//! leaves the stored document untouched.

/// Tender awards and work-authorization generation
pub mod award;
/// Bid submission and lookup
pub mod bid;
/// Per-line accept/reject decisions
pub mod decision;
/// Vendor compliance documents
pub mod document;
/// Work-authorization exporters
pub mod export;
/// Load-time normalization of stored documents
pub mod migrate;
/// Bid comparison reports
pub mod report;
/// RFP registry
pub mod rfp;
/// Display sequence numbers
pub mod sequence;
/// Persistent document store
pub mod store;
/// Vendor directory
pub mod vendor;
