//! Vendor compliance documents (agreements, authorizations, insurance).

use crate::models::items::PricedItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of compliance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// Master service agreement
    #[serde(rename = "MSA")]
    Msa,
    /// Work authorization
    #[serde(rename = "WA")]
    Wa,
    /// General liability insurance
    #[serde(rename = "GL")]
    Gl,
    /// Workers compensation board clearance
    #[serde(rename = "WCB")]
    Wcb,
    /// Errors and omissions insurance
    #[serde(rename = "EO")]
    Eo,
    /// Anything else
    Other,
}

/// Metadata of an attached file. The file body is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// Original file name
    pub name: String,
    /// MIME type
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Last-modified time in milliseconds since the epoch
    #[serde(default)]
    pub last_modified: i64,
}

/// A compliance document held for a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceDocument {
    /// Document id (`MSA-2025`, `doc-x81kq2a`)
    pub id: String,
    /// Kind of document
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Projects the document applies to (empty = all)
    #[serde(default)]
    pub projects: Vec<String>,
    /// Models the document applies to (empty = all)
    #[serde(default)]
    pub models: Vec<String>,
    /// Start of validity
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    /// End of validity
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Attached files
    #[serde(default)]
    pub files: Vec<FileMeta>,
    /// Ids of documents this one replaces
    #[serde(default)]
    pub supersedes: Vec<String>,
    /// Id of the document that replaced this one
    #[serde(default)]
    pub superseded_by: Option<String>,
    /// Authorized lines, used by work authorizations
    #[serde(default)]
    pub items: Vec<PricedItem>,
}

impl ComplianceDocument {
    /// True while no newer version replaces this document.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        self.superseded_by.is_none()
    }
}

/// Fields collected when uploading a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentForm {
    /// Explicit id (reference number); generated when `None`
    pub id: Option<String>,
    /// Kind of document
    pub doc_type: DocumentType,
    /// Projects covered
    pub projects: Vec<String>,
    /// Models covered
    pub models: Vec<String>,
    /// Start of validity
    pub valid_from: Option<NaiveDate>,
    /// End of validity
    pub valid_to: Option<NaiveDate>,
    /// Attached files
    pub files: Vec<FileMeta>,
    /// Authorized lines
    pub items: Vec<PricedItem>,
}

/// Expiry status shown on document tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Valid for more than the warning window
    Valid,
    /// Expires within the warning window
    ExpiringSoon,
    /// On or past its `validTo` date
    Expired,
    /// No expiry date recorded
    NoExpiry,
}
