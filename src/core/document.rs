//! Vendor compliance documents - upload, supersession and expiry status.

use crate::{
    core::{store::Store, vendor::uid},
    errors::{Error, Result},
    models::{ComplianceDocument, DocumentForm, DocumentStatus, PortalDocument},
};
use chrono::NaiveDate;
use tracing::info;

/// Days before `validTo` at which a document is flagged as expiring soon.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

fn build_document(
    doc: &PortalDocument,
    vendor_id: &str,
    form: &DocumentForm,
) -> Result<ComplianceDocument> {
    if doc.vendor(vendor_id).is_none() {
        return Err(Error::VendorNotFound {
            id: vendor_id.to_string(),
        });
    }
    if let (Some(from), Some(to)) = (form.valid_from, form.valid_to) {
        if from > to {
            return Err(Error::validation(format!(
                "Valid from ({from}) must not be after valid to ({to})"
            )));
        }
    }

    let existing = doc.documents.get(vendor_id);
    let taken = |id: &str| existing.is_some_and(|docs| docs.iter().any(|d| d.id == id));
    let id = match form.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if taken(id) => {
            return Err(Error::validation(format!(
                "Document {id} already exists for vendor {vendor_id}"
            )));
        }
        Some(id) => id.to_string(),
        None => {
            let mut id = uid("doc");
            while taken(&id) {
                id = uid("doc");
            }
            id
        }
    };

    Ok(ComplianceDocument {
        id,
        doc_type: form.doc_type,
        projects: form.projects.clone(),
        models: form.models.clone(),
        valid_from: form.valid_from,
        valid_to: form.valid_to,
        files: form.files.clone(),
        supersedes: Vec::new(),
        superseded_by: None,
        items: form.items.clone(),
    })
}

/// Adds a compliance document for a vendor.
///
/// # Errors
/// [`Error::VendorNotFound`] for an unknown vendor, [`Error::Validation`] when
/// the validity range is inverted or the id is already used by that vendor.
pub async fn add_document(
    store: &Store,
    vendor_id: &str,
    form: &DocumentForm,
) -> Result<ComplianceDocument> {
    let document = store
        .update(|doc| {
            let document = build_document(doc, vendor_id, form)?;
            doc.documents
                .entry(vendor_id.to_string())
                .or_default()
                .push(document.clone());
            Ok(document)
        })
        .await?;

    info!(
        "Added {:?} document {} for vendor {}",
        document.doc_type, document.id, vendor_id
    );
    Ok(document)
}

/// Uploads a new version of a document and links the two.
///
/// The old document gets `supersededBy`, the new one lists the old id in
/// `supersedes`.
///
/// # Errors
/// [`Error::DocumentNotFound`] when `old_id` is unknown, [`Error::Validation`]
/// when it was already superseded or the new form is invalid.
pub async fn supersede_document(
    store: &Store,
    vendor_id: &str,
    old_id: &str,
    form: &DocumentForm,
) -> Result<ComplianceDocument> {
    let document = store
        .update(|doc| {
            let old = doc
                .documents
                .get(vendor_id)
                .and_then(|docs| docs.iter().find(|d| d.id == old_id))
                .ok_or_else(|| Error::DocumentNotFound {
                    vendor_id: vendor_id.to_string(),
                    id: old_id.to_string(),
                })?;
            if let Some(newer) = &old.superseded_by {
                return Err(Error::validation(format!(
                    "Document {old_id} was already superseded by {newer}"
                )));
            }

            let mut document = build_document(doc, vendor_id, form)?;
            document.supersedes.push(old_id.to_string());

            let docs = doc.documents.entry(vendor_id.to_string()).or_default();
            if let Some(old) = docs.iter_mut().find(|d| d.id == old_id) {
                old.superseded_by = Some(document.id.clone());
            }
            docs.push(document.clone());
            Ok(document)
        })
        .await?;

    info!(
        "Document {} supersedes {} for vendor {}",
        document.id, old_id, vendor_id
    );
    Ok(document)
}

/// A vendor's documents, optionally including superseded versions.
pub async fn list_documents(
    store: &Store,
    vendor_id: &str,
    include_superseded: bool,
) -> Result<Vec<ComplianceDocument>> {
    let mut doc = store.load().await?;
    let documents = doc.documents.remove(vendor_id).unwrap_or_default();
    Ok(documents
        .into_iter()
        .filter(|d| include_superseded || d.is_current())
        .collect())
}

/// Finds one of a vendor's documents.
pub async fn get_document(
    store: &Store,
    vendor_id: &str,
    document_id: &str,
) -> Result<Option<ComplianceDocument>> {
    let doc = store.load().await?;
    Ok(doc
        .documents
        .get(vendor_id)
        .and_then(|docs| docs.iter().find(|d| d.id == document_id))
        .cloned())
}

/// Expiry status of a document as of `today`.
///
/// A document is expired from its `valid_to` day onwards.
#[must_use]
pub fn document_status(document: &ComplianceDocument, today: NaiveDate) -> DocumentStatus {
    let Some(valid_to) = document.valid_to else {
        return DocumentStatus::NoExpiry;
    };
    let days_left = (valid_to - today).num_days();
    if days_left <= 0 {
        DocumentStatus::Expired
    } else if days_left <= EXPIRY_WARNING_DAYS {
        DocumentStatus::ExpiringSoon
    } else {
        DocumentStatus::Valid
    }
}
