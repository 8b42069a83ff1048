//! Per-line accept/reject decisions made while reviewing bids on one RFP.
//!
//! A line is in exactly one of three states: unset, accepted by a vendor, or
//! rejected for a vendor. Choosing the same verdict for the same vendor twice
//! clears it. The board lives in memory only and is handed to the award engine.

use crate::models::{ItemSet, LineRef, PricedItem};
use std::collections::BTreeMap;

/// Outcome recorded for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The vendor's price for this line is accepted
    Accepted,
    /// The vendor's price for this line is rejected
    Rejected,
}

/// The vendor and price a verdict was given for.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDecision {
    /// Vendor whose price was judged
    pub vendor_id: String,
    /// Line name
    pub name: String,
    /// Quoted price
    pub price: f64,
}

/// Accept/reject state for the lines of one RFP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionBoard {
    accepted: BTreeMap<LineRef, LineDecision>,
    rejected: BTreeMap<LineRef, LineDecision>,
}

impl DecisionBoard {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `vendor_id`'s price for `line`, or clears the acceptance if that
    /// vendor already holds it. Any rejection on the line is cleared either way.
    pub fn accept(&mut self, vendor_id: &str, line: &LineRef, price: f64) {
        Self::toggle(&mut self.accepted, &mut self.rejected, vendor_id, line, price);
    }

    /// Rejects `vendor_id`'s price for `line`; mirror image of [`DecisionBoard::accept`].
    pub fn reject(&mut self, vendor_id: &str, line: &LineRef, price: f64) {
        Self::toggle(&mut self.rejected, &mut self.accepted, vendor_id, line, price);
    }

    fn toggle(
        target: &mut BTreeMap<LineRef, LineDecision>,
        other: &mut BTreeMap<LineRef, LineDecision>,
        vendor_id: &str,
        line: &LineRef,
        price: f64,
    ) {
        other.remove(line);
        if target.get(line).is_some_and(|d| d.vendor_id == vendor_id) {
            target.remove(line);
        } else {
            target.insert(
                line.clone(),
                LineDecision {
                    vendor_id: vendor_id.to_string(),
                    name: line.name.clone(),
                    price,
                },
            );
        }
    }

    /// The verdict on `line` for `vendor_id`, if that vendor holds one.
    #[must_use]
    pub fn status(&self, vendor_id: &str, line: &LineRef) -> Option<Verdict> {
        if self.accepted.get(line).is_some_and(|d| d.vendor_id == vendor_id) {
            Some(Verdict::Accepted)
        } else if self.rejected.get(line).is_some_and(|d| d.vendor_id == vendor_id) {
            Some(Verdict::Rejected)
        } else {
            None
        }
    }

    /// Decision currently recorded on `line`, with its verdict.
    #[must_use]
    pub fn decision(&self, line: &LineRef) -> Option<(Verdict, &LineDecision)> {
        self.accepted
            .get(line)
            .map(|d| (Verdict::Accepted, d))
            .or_else(|| self.rejected.get(line).map(|d| (Verdict::Rejected, d)))
    }

    /// True when at least one line is accepted.
    #[must_use]
    pub fn has_accepted(&self) -> bool {
        !self.accepted.is_empty()
    }

    /// Number of accepted lines.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Number of rejected lines.
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Accepted lines as a priced item set, whichever vendor they came from.
    #[must_use]
    pub fn accepted_selection(&self) -> ItemSet<PricedItem> {
        let mut selection = ItemSet::default();
        for (line, decision) in &self.accepted {
            selection.push(
                line.category,
                line.model.as_deref(),
                PricedItem::new(decision.name.clone(), decision.price),
            );
        }
        selection
    }

    /// Forgets every decision.
    pub fn clear(&mut self) {
        self.accepted.clear();
        self.rejected.clear();
    }
}
