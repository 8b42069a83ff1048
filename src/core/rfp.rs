//! RFP business logic - creating, editing and querying requests for proposal.
//!
//! RFP ids come from the `rfp` counter and are minted inside the same save as
//! the new record.

use crate::{
    config::Catalog,
    core::{sequence::SequenceKind, store::Store},
    errors::{Error, Result},
    models::{PortalDocument, Rfp, RfpForm},
};
use tracing::info;

/// An RFP as seen from a vendor's dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRfp {
    /// The RFP the vendor was invited to
    pub rfp: Rfp,
    /// Whether the vendor already submitted a bid
    pub has_bid: bool,
}

/// Checks a form against the document and returns the cleaned-up values.
///
/// Per-model lines are kept only for models the RFP covers and invited vendors
/// must exist in the directory.
fn prepare_form(doc: &PortalDocument, form: &RfpForm) -> Result<RfpForm> {
    let mut invited: Vec<String> = Vec::new();
    for vendor_id in &form.invited_vendor_ids {
        if doc.vendor(vendor_id).is_none() {
            return Err(Error::validation(format!(
                "Invited vendor {vendor_id} is not in the directory"
            )));
        }
        if !invited.contains(vendor_id) {
            invited.push(vendor_id.clone());
        }
    }

    let mut items = form.items.clone();
    items.retain_models(&form.models);

    Ok(RfpForm {
        title: form.title.trim().to_string(),
        projects: form.projects.clone(),
        models: form.models.clone(),
        due_date: form.due_date,
        items,
        invited_vendor_ids: invited,
    })
}

/// A create form whose lines are every catalog line for `models`.
#[must_use]
pub fn form_from_catalog(
    catalog: &Catalog,
    title: &str,
    models: Vec<String>,
    invited_vendor_ids: Vec<String>,
) -> RfpForm {
    RfpForm {
        title: title.to_string(),
        items: catalog.items_for(&models),
        models,
        invited_vendor_ids,
        ..RfpForm::default()
    }
}

/// Creates an RFP with the next `RFP-NNN` id.
///
/// A blank title defaults to the id.
///
/// # Errors
/// [`Error::Validation`] when an invited vendor does not exist or the RFP
/// sequence is exhausted.
pub async fn create_rfp(store: &Store, form: &RfpForm) -> Result<Rfp> {
    let rfp = store
        .update(|doc| {
            let form = prepare_form(doc, form)?;
            let id = doc.counters.next_id(SequenceKind::Rfp)?;
            let title = if form.title.is_empty() {
                id.clone()
            } else {
                form.title
            };
            let rfp = Rfp {
                id,
                title,
                projects: form.projects,
                models: form.models,
                due_date: form.due_date,
                items: form.items,
                invited_vendor_ids: form.invited_vendor_ids,
                awarded_to: None,
                awarded_at: None,
                work_authorization: None,
            };
            doc.rfps.push(rfp.clone());
            Ok(rfp)
        })
        .await?;

    info!(
        "Created {} '{}' with {} line(s) and {} invited vendor(s)",
        rfp.id,
        rfp.title,
        rfp.items.len(),
        rfp.invited_vendor_ids.len()
    );
    Ok(rfp)
}

/// Replaces an RFP's editable fields. The id and award state are kept.
///
/// # Errors
/// [`Error::RfpNotFound`] for an unknown id, [`Error::Validation`] when an
/// invited vendor does not exist.
pub async fn update_rfp(store: &Store, rfp_id: &str, form: &RfpForm) -> Result<Rfp> {
    let rfp = store
        .update(|doc| {
            let form = prepare_form(doc, form)?;
            let rfp = doc.rfp_mut(rfp_id).ok_or_else(|| Error::RfpNotFound {
                id: rfp_id.to_string(),
            })?;
            rfp.title = if form.title.is_empty() {
                rfp.id.clone()
            } else {
                form.title
            };
            rfp.projects = form.projects;
            rfp.models = form.models;
            rfp.due_date = form.due_date;
            rfp.items = form.items;
            rfp.invited_vendor_ids = form.invited_vendor_ids;
            Ok(rfp.clone())
        })
        .await?;

    info!("Updated {}", rfp.id);
    Ok(rfp)
}

/// Deletes an RFP together with the bids submitted against it.
///
/// The RFP counter is not rewound, so the id is never reused.
///
/// # Errors
/// [`Error::RfpNotFound`] for an unknown id.
pub async fn delete_rfp(store: &Store, rfp_id: &str) -> Result<Rfp> {
    let (rfp, dropped_bids) = store
        .update(|doc| {
            let index = doc
                .rfps
                .iter()
                .position(|rfp| rfp.id == rfp_id)
                .ok_or_else(|| Error::RfpNotFound {
                    id: rfp_id.to_string(),
                })?;
            let rfp = doc.rfps.remove(index);
            let before = doc.bids.len();
            doc.bids.retain(|bid| bid.rfp_id != rfp_id);
            Ok((rfp, before - doc.bids.len()))
        })
        .await?;

    info!("Deleted {} and {} bid(s) against it", rfp.id, dropped_bids);
    Ok(rfp)
}

/// Finds an RFP by id.
pub async fn get_rfp(store: &Store, rfp_id: &str) -> Result<Option<Rfp>> {
    Ok(store.load().await?.rfp(rfp_id).cloned())
}

/// Lists all RFPs in creation order.
pub async fn list_rfps(store: &Store) -> Result<Vec<Rfp>> {
    Ok(store.load().await?.rfps)
}

/// RFPs a vendor is invited to, each flagged with whether the vendor has bid.
pub async fn rfps_for_vendor(store: &Store, vendor_id: &str) -> Result<Vec<VendorRfp>> {
    let doc = store.load().await?;
    if doc.vendor(vendor_id).is_none() {
        return Err(Error::VendorNotFound {
            id: vendor_id.to_string(),
        });
    }

    Ok(doc
        .rfps
        .iter()
        .filter(|rfp| rfp.is_invited(vendor_id))
        .map(|rfp| VendorRfp {
            has_bid: doc.vendor_bid(&rfp.id, vendor_id).is_some(),
            rfp: rfp.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::Catalog;
    use crate::core::bid::{get_bids_by_rfp, get_bids_by_vendor, submit_bid};
    use crate::models::{Category, ItemSet, LineRef, PricedItem, RfpItem};
    use crate::test_utils::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_rfp_mints_sequential_ids() -> Result<()> {
        let store = setup_test_store().await?;

        let first = create_rfp(&store, &test_rfp_form(&["v1"])).await?;
        let second = create_rfp(&store, &test_rfp_form(&["v2"])).await?;

        assert_eq!(first.id, "RFP-001");
        assert_eq!(second.id, "RFP-002");
        assert_eq!(first.title, "Foundations - Glenridding");
        assert_eq!(store.load().await?.counters.rfp, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_title_defaults_to_id() -> Result<()> {
        let store = setup_test_store().await?;
        let mut form = test_rfp_form(&["v1"]);
        form.title = "   ".into();

        let rfp = create_rfp(&store, &form).await?;
        assert_eq!(rfp.title, rfp.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_model_items_pruned_to_selected_models() -> Result<()> {
        let store = setup_test_store().await?;
        let mut form = test_rfp_form(&["v1"]);
        form.models = vec!["SF24".into()];
        form.items
            .push(Category::Models, Some("SF24"), RfpItem::new("Garage"));
        form.items
            .push(Category::Models, Some("SF28"), RfpItem::new("Basement Dev."));

        let rfp = create_rfp(&store, &form).await?;
        assert!(rfp.items.contains(&LineRef::model("SF24", "Garage")));
        assert!(!rfp.items.models.contains_key("SF28"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_invited_vendor_rejected_without_minting() -> Result<()> {
        let store = setup_test_store().await?;
        store.initialize().await?;

        let result = create_rfp(&store, &test_rfp_form(&["v1", "v404"])).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(store.load().await?.counters.rfp, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rfp_keeps_award_state() -> Result<()> {
        let store = setup_test_store().await?;
        let rfp = create_rfp(&store, &test_rfp_form(&["v1"])).await?;
        store
            .update(|doc| {
                let stored = doc.rfp_mut(&rfp.id).unwrap();
                stored.awarded_to = Some("v1".into());
                Ok(())
            })
            .await?;

        let mut form = test_rfp_form(&["v1", "v2"]);
        form.due_date = NaiveDate::from_ymd_opt(2025, 9, 30);
        form.items = ItemSet::default();
        let updated = update_rfp(&store, &rfp.id, &form).await?;

        assert_eq!(updated.id, rfp.id);
        assert_eq!(updated.awarded_to.as_deref(), Some("v1"));
        assert_eq!(updated.invited_vendor_ids, vec!["v1", "v2"]);
        assert!(updated.items.is_empty());

        let missing = update_rfp(&store, "RFP-404", &form).await;
        assert!(matches!(missing, Err(Error::RfpNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_rfps_for_vendor_flags_bids() -> Result<()> {
        let store = setup_test_store().await?;
        let first = create_rfp(&store, &test_rfp_form(&["v1", "v2"])).await?;
        let second = create_rfp(&store, &test_rfp_form(&["v1"])).await?;
        create_rfp(&store, &test_rfp_form(&["v3"])).await?;

        let mut items = ItemSet::default();
        items.push(Category::Globals, None, PricedItem::new("Footings", 120.0));
        submit_bid(&store, &first.id, "v1", items).await?;

        let dashboard = rfps_for_vendor(&store, "v1").await?;
        assert_eq!(dashboard.len(), 2);
        assert_eq!(dashboard[0].rfp.id, first.id);
        assert!(dashboard[0].has_bid);
        assert_eq!(dashboard[1].rfp.id, second.id);
        assert!(!dashboard[1].has_bid);

        assert_eq!(rfps_for_vendor(&store, "v3").await?.len(), 1);
        assert!(matches!(
            rfps_for_vendor(&store, "v404").await,
            Err(Error::VendorNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rfp_removes_its_bids() -> Result<()> {
        let (store, rfp_id) = setup_with_bids().await?;
        let other = create_rfp(&store, &test_rfp_form(&["v1"])).await?;
        let mut items = ItemSet::default();
        items.push(Category::Globals, None, PricedItem::new("Footings", 95.0));
        submit_bid(&store, &other.id, "v1", items).await?;

        let deleted = delete_rfp(&store, &rfp_id).await?;
        assert_eq!(deleted.id, rfp_id);
        assert!(get_rfp(&store, &rfp_id).await?.is_none());
        assert!(get_bids_by_rfp(&store, &rfp_id).await?.is_empty());

        let v1_bids = get_bids_by_vendor(&store, "v1").await?;
        assert_eq!(v1_bids.len(), 1);
        assert_eq!(v1_bids[0].rfp_id, other.id);

        // Ids are not reused after a delete
        let next = create_rfp(&store, &test_rfp_form(&["v2"])).await?;
        assert_eq!(next.id, "RFP-003");

        assert!(matches!(
            delete_rfp(&store, &rfp_id).await,
            Err(Error::RfpNotFound { .. })
        ));
        assert_eq!(list_rfps(&store).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_rfp_counter_fails_without_saving() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .update(|doc| {
                doc.counters.rfp = u32::MAX;
                Ok(())
            })
            .await?;

        let result = create_rfp(&store, &test_rfp_form(&["v1"])).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let doc = store.load().await?;
        assert!(doc.rfps.is_empty());
        assert_eq!(doc.counters.rfp, u32::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rfp_from_catalog() -> Result<()> {
        let store = setup_test_store().await?;
        let catalog = Catalog::default();
        let form = form_from_catalog(
            &catalog,
            "Basements - Glenridding",
            vec!["SF28".to_string()],
            vec!["v1".to_string(), "v3".to_string()],
        );

        let rfp = create_rfp(&store, &form).await?;
        assert_eq!(rfp.title, "Basements - Glenridding");
        assert_eq!(rfp.items, catalog.items_for(&["SF28".to_string()]));
        assert!(rfp.items.contains(&LineRef::model("SF28", "Basement Dev.")));
        assert!(!rfp.items.models.contains_key("SF24"));
        assert_eq!(rfp.invited_vendor_ids, vec!["v1", "v3"]);
        assert!(rfp.due_date.is_none());
        Ok(())
    }
}
