//! Awarding tenders and generating work authorizations.
//!
//! The WA number is minted on a loaded copy of the document and only recorded
//! once the exporter has succeeded, so a failed export never burns a number.

use crate::{
    core::{
        decision::DecisionBoard,
        export::{
            ExportArtifact, RfpSnapshot, VendorSnapshot, WorkAuthorizationExporter,
            WorkAuthorizationPackage,
        },
        sequence::SequenceKind,
        store::Store,
    },
    errors::{Error, Result},
    models::{ItemSet, PricedItem, Rfp},
};
use chrono::Utc;
use tracing::{error, info, warn};

/// A generated work authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkAuthorization {
    /// `WA-NNN` number
    pub number: String,
    /// RFP it authorizes
    pub rfp_id: String,
    /// Vendor it authorizes
    pub vendor_id: String,
    /// Authorized lines
    pub selections: ItemSet<PricedItem>,
    /// What the exporter produced
    pub artifact: ExportArtifact,
}

impl WorkAuthorization {
    /// Total authorized amount.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.selections.total()
    }
}

/// Result of [`award_tender`].
#[derive(Debug, Clone, PartialEq)]
pub struct AwardOutcome {
    /// The RFP after the award was recorded
    pub rfp: Rfp,
    /// Set when accepted lines triggered a work authorization
    pub work_authorization: Option<WorkAuthorization>,
}

/// Awards an RFP to a vendor.
///
/// Records `awardedTo` and `awardedAt`. When the board holds accepted lines, a
/// work authorization for those lines is generated straight away.
///
/// # Errors
/// [`Error::RfpNotFound`] / [`Error::VendorNotFound`] for unknown ids. If the
/// follow-up export fails the error is returned but the award stays recorded.
pub async fn award_tender(
    store: &Store,
    rfp_id: &str,
    vendor_id: &str,
    board: &DecisionBoard,
    exporter: &dyn WorkAuthorizationExporter,
) -> Result<AwardOutcome> {
    let rfp = store
        .update(|doc| {
            if doc.vendor(vendor_id).is_none() {
                return Err(Error::VendorNotFound {
                    id: vendor_id.to_string(),
                });
            }
            let rfp = doc.rfp_mut(rfp_id).ok_or_else(|| Error::RfpNotFound {
                id: rfp_id.to_string(),
            })?;
            if let Some(previous) = rfp.awarded_to.as_deref().filter(|p| *p != vendor_id) {
                warn!("{} was awarded to {}, re-awarding to {}", rfp_id, previous, vendor_id);
            }
            rfp.awarded_to = Some(vendor_id.to_string());
            rfp.awarded_at = Some(Utc::now());
            Ok(rfp.clone())
        })
        .await?;
    info!("Awarded {} to {}", rfp.id, vendor_id);

    if !board.has_accepted() {
        return Ok(AwardOutcome {
            rfp,
            work_authorization: None,
        });
    }

    let work_authorization = generate_wa(store, rfp_id, Some(vendor_id), board, exporter).await?;
    let rfp = store
        .load()
        .await?
        .rfp(rfp_id)
        .cloned()
        .ok_or_else(|| Error::RfpNotFound {
            id: rfp_id.to_string(),
        })?;

    Ok(AwardOutcome {
        rfp,
        work_authorization: Some(work_authorization),
    })
}

/// Generates and exports a work authorization.
///
/// # Arguments
/// * `vendor_id` - Vendor to authorize; defaults to the RFP's awarded vendor
/// * `board` - Accepted lines become the selection. With nothing accepted, the
///   vendor's whole bid is authorized.
///
/// # Errors
/// [`Error::Validation`] when no vendor can be resolved, [`Error::Export`] when
/// the exporter fails. Neither records anything.
pub async fn generate_wa(
    store: &Store,
    rfp_id: &str,
    vendor_id: Option<&str>,
    board: &DecisionBoard,
    exporter: &dyn WorkAuthorizationExporter,
) -> Result<WorkAuthorization> {
    let mut doc = store.load().await?;
    let rfp = doc.rfp(rfp_id).ok_or_else(|| Error::RfpNotFound {
        id: rfp_id.to_string(),
    })?;

    let vendor = vendor_id
        .or(rfp.awarded_to.as_deref())
        .and_then(|id| doc.vendor(id))
        .ok_or_else(|| Error::validation("Please select a vendor to award the tender to first"))?;

    let selections = if board.has_accepted() {
        board.accepted_selection()
    } else {
        let bid_items = doc
            .vendor_bid(rfp_id, &vendor.id)
            .map(|bid| bid.items.clone())
            .unwrap_or_default();
        info!(
            "No accepted lines on {}, authorizing {}'s full bid ({} line(s))",
            rfp_id,
            vendor.id,
            bid_items.len()
        );
        bid_items
    };

    let vendor = VendorSnapshot::from(vendor);
    let rfp = RfpSnapshot::from(rfp);
    let wa_number = doc.counters.next_id(SequenceKind::WorkAuthorization)?;
    let package = WorkAuthorizationPackage {
        vendor,
        rfp,
        selections,
        wa_number,
        issued_on: Utc::now().date_naive(),
    };

    let artifact = exporter.export(&package).map_err(|e| {
        error!("Export of {} failed: {}", package.wa_number, e);
        match e {
            Error::Export { .. } => e,
            other => Error::Export {
                message: other.to_string(),
            },
        }
    })?;

    let WorkAuthorizationPackage {
        vendor,
        selections,
        wa_number,
        ..
    } = package;
    let used = SequenceKind::WorkAuthorization.parse(&wa_number);
    store
        .update(|doc| {
            if let Some(used) = used {
                doc.counters
                    .ensure_above(SequenceKind::WorkAuthorization, used);
            }
            let rfp = doc.rfp_mut(rfp_id).ok_or_else(|| Error::RfpNotFound {
                id: rfp_id.to_string(),
            })?;
            rfp.work_authorization = Some(wa_number.clone());
            Ok(())
        })
        .await?;

    info!(
        "Generated {} for {} on {} ({} line(s))",
        wa_number,
        vendor.id,
        rfp_id,
        selections.len()
    );
    Ok(WorkAuthorization {
        number: wa_number,
        rfp_id: rfp_id.to_string(),
        vendor_id: vendor.id,
        selections,
        artifact,
    })
}
