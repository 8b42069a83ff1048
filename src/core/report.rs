//! Report generation business logic.
//!
//! This module builds bid comparisons for tender review. Functions return
//! structured data; formatting into text is left to the caller apart from the
//! small currency helper.

use crate::{
    core::store::Store,
    errors::{Error, Result},
    models::{ItemSet, LineRef, PricedItem},
};

/// One vendor's standing on an RFP.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorTotal {
    /// Vendor id
    pub vendor_id: String,
    /// Vendor name, or the id when the vendor is no longer in the directory
    pub vendor_name: String,
    /// Whether the vendor was invited
    pub invited: bool,
    /// Bid id, `None` when the vendor has not bid
    pub bid_id: Option<String>,
    /// Sum of all bid prices, `None` when the vendor has not bid
    pub total: Option<f64>,
}

/// Prices quoted for a single RFP line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineComparison {
    /// The line
    pub line: LineRef,
    /// (vendor id, price) for every vendor that priced the line
    pub prices: Vec<(String, f64)>,
    /// Vendor with the lowest price; the earlier bidder wins a tie
    pub lowest: Option<String>,
}

/// Side-by-side view of all bids on an RFP.
#[derive(Debug, Clone, PartialEq)]
pub struct TenderComparison {
    /// RFP id
    pub rfp_id: String,
    /// Invited vendors first, then any other bidders
    pub vendors: Vec<VendorTotal>,
    /// One row per RFP line
    pub lines: Vec<LineComparison>,
}

impl TenderComparison {
    /// Vendor with the lowest overall bid.
    #[must_use]
    pub fn lowest_bidder(&self) -> Option<&VendorTotal> {
        self.vendors
            .iter()
            .filter(|v| v.total.is_some())
            .min_by(|a, b| {
                a.total
                    .unwrap_or_default()
                    .total_cmp(&b.total.unwrap_or_default())
            })
    }

    /// Number of vendors that have bid.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.vendors.iter().filter(|v| v.bid_id.is_some()).count()
    }
}

/// Total value of a bid's priced lines.
#[must_use]
pub fn bid_total(items: &ItemSet<PricedItem>) -> f64 {
    items.total()
}

/// Compares every bid on an RFP.
///
/// # Arguments
/// * `store` - Portal store
/// * `rfp_id` - RFP to compare
///
/// # Returns
/// Vendor totals and a per-line price table with the lowest bidder per line
///
/// # Errors
/// [`Error::RfpNotFound`] for an unknown RFP.
pub async fn compare_bids(store: &Store, rfp_id: &str) -> Result<TenderComparison> {
    let doc = store.load().await?;
    let rfp = doc.rfp(rfp_id).ok_or_else(|| Error::RfpNotFound {
        id: rfp_id.to_string(),
    })?;

    let mut vendor_ids: Vec<&str> = rfp.invited_vendor_ids.iter().map(String::as_str).collect();
    for bid in doc.bids.iter().filter(|b| b.rfp_id == rfp_id) {
        if !vendor_ids.contains(&bid.vendor_id.as_str()) {
            vendor_ids.push(&bid.vendor_id);
        }
    }

    let vendors: Vec<VendorTotal> = vendor_ids
        .iter()
        .map(|&vendor_id| {
            let bid = doc.vendor_bid(rfp_id, vendor_id);
            VendorTotal {
                vendor_id: vendor_id.to_string(),
                vendor_name: doc
                    .vendor(vendor_id)
                    .map_or_else(|| vendor_id.to_string(), |v| v.name.clone()),
                invited: rfp.is_invited(vendor_id),
                bid_id: bid.map(|b| b.id.clone()),
                total: bid.map(|b| bid_total(&b.items)),
            }
        })
        .collect();

    let lines = rfp
        .items
        .lines()
        .map(|(line, _)| {
            let prices: Vec<(String, f64)> = vendor_ids
                .iter()
                .filter_map(|&vendor_id| {
                    let item = doc.vendor_bid(rfp_id, vendor_id)?.items.get(&line)?;
                    Some((vendor_id.to_string(), item.price))
                })
                .collect();
            let lowest = prices
                .iter()
                .fold(None::<&(String, f64)>, |best, entry| match best {
                    Some(best) if best.1 <= entry.1 => Some(best),
                    _ => Some(entry),
                })
                .map(|(vendor_id, _)| vendor_id.clone());
            LineComparison {
                line,
                prices,
                lowest,
            }
        })
        .collect();

    Ok(TenderComparison {
        rfp_id: rfp.id.clone(),
        vendors,
        lines,
    })
}

/// Formats an amount as dollars with two decimals, like "$1020.50" or "-$5.00".
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}
