//! Bid repository - submission and lookup of vendor bids.
//!
//! There is at most one bid per (RFP, vendor). Resubmitting replaces the earlier
//! bid with a new one carrying a fresh id and timestamp.

use crate::{
    core::{sequence::SequenceKind, store::Store},
    errors::{Error, Result},
    models::{Bid, BidForm, BidStatus, ItemSet, PricedItem},
};
use chrono::Utc;
use tracing::info;

/// Records a bid, replacing any earlier bid from the same vendor on the same RFP.
///
/// No invitation or line checks happen here; see [`submit_bid_form`] for the
/// validated vendor-facing path.
pub async fn submit_bid(
    store: &Store,
    rfp_id: &str,
    vendor_id: &str,
    items: ItemSet<PricedItem>,
) -> Result<Bid> {
    let (bid, replaced) = store
        .update(|doc| {
            let bid = Bid {
                id: doc.counters.next_id(SequenceKind::Bid)?,
                rfp_id: rfp_id.to_string(),
                vendor_id: vendor_id.to_string(),
                submitted_at: Utc::now(),
                status: BidStatus::Submitted,
                items,
            };
            let before = doc.bids.len();
            doc.bids.retain(|b| !b.matches(rfp_id, vendor_id));
            let replaced = doc.bids.len() < before;
            doc.bids.push(bid.clone());
            Ok((bid, replaced))
        })
        .await?;

    if replaced {
        info!(
            "Vendor {} resubmitted on {} as {} ({} line(s))",
            vendor_id,
            rfp_id,
            bid.id,
            bid.items.len()
        );
    } else {
        info!(
            "Vendor {} submitted {} on {} ({} line(s))",
            vendor_id,
            bid.id,
            rfp_id,
            bid.items.len()
        );
    }
    Ok(bid)
}

/// Validates a vendor's submission form and records the bid.
///
/// The vendor must have acknowledged the terms and be invited to the RFP. Every
/// priced line has to exist on the RFP with a finite, non-negative price.
///
/// # Errors
/// [`Error::RfpNotFound`] / [`Error::VendorNotFound`] for unknown ids,
/// [`Error::Validation`] for everything else.
pub async fn submit_bid_form(store: &Store, form: &BidForm) -> Result<Bid> {
    if !form.terms_acknowledged {
        return Err(Error::validation(
            "Please acknowledge the terms and conditions before submitting",
        ));
    }

    let doc = store.load().await?;
    let rfp = doc.rfp(&form.rfp_id).ok_or_else(|| Error::RfpNotFound {
        id: form.rfp_id.clone(),
    })?;
    if doc.vendor(&form.vendor_id).is_none() {
        return Err(Error::VendorNotFound {
            id: form.vendor_id.clone(),
        });
    }
    if !rfp.is_invited(&form.vendor_id) {
        return Err(Error::validation(format!(
            "Vendor {} is not invited to {}",
            form.vendor_id, rfp.id
        )));
    }
    if form.items.is_empty() {
        return Err(Error::validation("Please price at least one line item"));
    }

    for (line, item) in form.items.lines() {
        if !rfp.items.contains(&line) {
            return Err(Error::validation(format!(
                "{line} is not a line item on {}",
                rfp.id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(Error::validation(format!(
                "Price for {line} must be a non-negative number"
            )));
        }
    }

    submit_bid(store, &form.rfp_id, &form.vendor_id, form.items.clone()).await
}

/// All bids a vendor has submitted, in submission order.
pub async fn get_bids_by_vendor(store: &Store, vendor_id: &str) -> Result<Vec<Bid>> {
    let doc = store.load().await?;
    Ok(doc
        .bids
        .into_iter()
        .filter(|b| b.vendor_id == vendor_id)
        .collect())
}

/// All bids on an RFP, in submission order.
pub async fn get_bids_by_rfp(store: &Store, rfp_id: &str) -> Result<Vec<Bid>> {
    let doc = store.load().await?;
    Ok(doc.bids.into_iter().filter(|b| b.rfp_id == rfp_id).collect())
}

/// Finds a bid by id.
pub async fn get_bid(store: &Store, bid_id: &str) -> Result<Option<Bid>> {
    let doc = store.load().await?;
    Ok(doc.bids.into_iter().find(|b| b.id == bid_id))
}

/// The bid a vendor submitted on an RFP, if any.
pub async fn get_vendor_bid(store: &Store, rfp_id: &str, vendor_id: &str) -> Result<Option<Bid>> {
    Ok(store.load().await?.vendor_bid(rfp_id, vendor_id).cloned())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::{Category, LineRef};
    use crate::test_utils::*;

    fn footings(price: f64) -> ItemSet<PricedItem> {
        let mut items = ItemSet::default();
        items.push(Category::Globals, None, PricedItem::new("Footings", price));
        items
    }

    #[tokio::test]
    async fn test_resubmission_replaces_previous_bid() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;

        let first = submit_bid(&store, &rfp_id, "v1", footings(120.0)).await?;
        let second = submit_bid(&store, &rfp_id, "v1", footings(110.0)).await?;

        assert_ne!(first.id, second.id);
        let bids = get_bids_by_rfp(&store, &rfp_id).await?;
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].id, second.id);
        assert_eq!(bids[0].items.total(), 110.0);
        assert!(second.submitted_at >= first.submitted_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_bid_ids_come_from_counter() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;

        let a = submit_bid(&store, &rfp_id, "v1", footings(120.0)).await?;
        let b = submit_bid(&store, &rfp_id, "v2", footings(130.0)).await?;

        assert_eq!(a.id, "bid-1");
        assert_eq!(b.id, "bid-2");
        assert_eq!(a.status, BidStatus::Submitted);
        assert_eq!(store.load().await?.counters.bid, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookups() -> Result<()> {
        let (store, rfp_id) = setup_with_bids().await?;

        let v1_bids = get_bids_by_vendor(&store, "v1").await?;
        assert_eq!(v1_bids.len(), 1);
        assert_eq!(v1_bids[0].rfp_id, rfp_id);

        assert_eq!(get_bids_by_rfp(&store, &rfp_id).await?.len(), 2);
        assert!(get_bids_by_rfp(&store, "RFP-404").await?.is_empty());

        let bid = get_bid(&store, &v1_bids[0].id).await?.unwrap();
        assert_eq!(bid.vendor_id, "v1");
        assert!(get_bid(&store, "bid-404").await?.is_none());

        assert!(get_vendor_bid(&store, &rfp_id, "v2").await?.is_some());
        assert!(get_vendor_bid(&store, &rfp_id, "v3").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_form_requires_terms() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;
        let form = BidForm {
            rfp_id,
            vendor_id: "v1".into(),
            items: footings(120.0),
            terms_acknowledged: false,
        };

        let result = submit_bid_form(&store, &form).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(store.load().await?.bids.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_form_rejects_uninvited_vendor() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;
        let form = BidForm {
            rfp_id,
            vendor_id: "v3".into(),
            items: footings(120.0),
            terms_acknowledged: true,
        };

        match submit_bid_form(&store, &form).await {
            Err(Error::Validation { message }) => assert!(message.contains("not invited")),
            other => panic!("expected validation error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_form_rejects_unknown_lines_and_bad_prices() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;

        let mut items = footings(120.0);
        items.push(Category::Globals, None, PricedItem::new("Roofing", 50.0));
        let form = BidForm {
            rfp_id: rfp_id.clone(),
            vendor_id: "v1".into(),
            items,
            terms_acknowledged: true,
        };
        match submit_bid_form(&store, &form).await {
            Err(Error::Validation { message }) => assert!(message.contains("Roofing")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let form = BidForm {
            items: footings(-1.0),
            ..form
        };
        assert!(matches!(
            submit_bid_form(&store, &form).await,
            Err(Error::Validation { .. })
        ));

        let form = BidForm {
            items: footings(f64::NAN),
            ..form
        };
        assert!(matches!(
            submit_bid_form(&store, &form).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_form_submits_valid_bid() -> Result<()> {
        let (store, rfp_id) = setup_with_rfp().await?;
        let form = BidForm {
            rfp_id: rfp_id.clone(),
            vendor_id: "v2".into(),
            items: footings(99.5),
            terms_acknowledged: true,
        };

        let bid = submit_bid_form(&store, &form).await?;
        let stored = get_vendor_bid(&store, &rfp_id, "v2").await?.unwrap();
        assert_eq!(stored, bid);
        assert_eq!(
            stored.items.get(&LineRef::global("Footings")).unwrap().price,
            99.5
        );

        let missing = BidForm {
            rfp_id: "RFP-404".into(),
            ..form
        };
        assert!(matches!(
            submit_bid_form(&store, &missing).await,
            Err(Error::RfpNotFound { .. })
        ));
        Ok(())
    }
}
