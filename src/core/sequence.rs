//! Sequence numbers for RFPs, work authorizations and bids.
//!
//! Numbers come from the counters stored inside the portal document. Minting
//! only touches the in-memory document: callers mint inside
//! [`Store::update`](crate::core::store::Store::update) so the counter bump and
//! the new record land in the same save.

use crate::{
    errors::{Error, Result},
    models::Counters,
};
use std::fmt;

/// Which sequence to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// `RFP-001`, `RFP-002`, ...
    Rfp,
    /// `WA-001`, `WA-002`, ...
    WorkAuthorization,
    /// `bid-1`, `bid-2`, ...
    Bid,
}

impl SequenceKind {
    /// Id prefix including the separator.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Rfp => "RFP-",
            Self::WorkAuthorization => "WA-",
            Self::Bid => "bid-",
        }
    }

    /// Formats `number` as an id of this kind.
    #[must_use]
    pub fn format(self, number: u32) -> String {
        match self {
            Self::Rfp | Self::WorkAuthorization => format!("{}{number:03}", self.prefix()),
            Self::Bid => format!("{}{number}", self.prefix()),
        }
    }

    /// Extracts the number from an id of this kind (`"RFP-007"` -> 7).
    #[must_use]
    pub fn parse(self, id: &str) -> Option<u32> {
        id.strip_prefix(self.prefix())?.parse().ok()
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfp => write!(f, "rfp"),
            Self::WorkAuthorization => write!(f, "wa"),
            Self::Bid => write!(f, "bid"),
        }
    }
}

impl Counters {
    fn slot(&mut self, kind: SequenceKind) -> &mut u32 {
        match kind {
            SequenceKind::Rfp => &mut self.rfp,
            SequenceKind::WorkAuthorization => &mut self.wa,
            SequenceKind::Bid => &mut self.bid,
        }
    }

    /// Current value of the counter for `kind` (the next number to be handed out).
    #[must_use]
    pub const fn peek(&self, kind: SequenceKind) -> u32 {
        match kind {
            SequenceKind::Rfp => self.rfp,
            SequenceKind::WorkAuthorization => self.wa,
            SequenceKind::Bid => self.bid,
        }
    }

    /// Formats the current counter for `kind` and advances it.
    ///
    /// # Errors
    /// [`Error::Validation`] when the sequence has no numbers left. The counter
    /// is left untouched.
    pub fn next_id(&mut self, kind: SequenceKind) -> Result<String> {
        let slot = self.slot(kind);
        let next = slot
            .checked_add(1)
            .ok_or_else(|| Error::validation(format!("The {kind} sequence is exhausted")))?;
        let id = kind.format(*slot);
        *slot = next;
        tracing::debug!("Minted {} id {}", kind, id);
        Ok(id)
    }

    /// Raises the counter for `kind` so it is strictly above `used`.
    ///
    /// Returns whether the counter moved, or `None` when `used` is the last
    /// number the counter can hold.
    pub fn ensure_above(&mut self, kind: SequenceKind, used: u32) -> Option<bool> {
        let slot = self.slot(kind);
        if *slot > used {
            return Some(false);
        }
        *slot = used.checked_add(1)?;
        Some(true)
    }
}
