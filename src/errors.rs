//! Unified error type for the procurement portal.
//!
//! `get_*` lookups return `Ok(None)` for an unknown id. Operations that change a
//! record report a missing one with a `*NotFound` variant. Validation failures
//! abort an operation before anything is written.

use thiserror::Error;

/// Errors raised by storage, domain operations and the work-authorization export.
#[derive(Debug, Error)]
pub enum Error {
    /// No RFP exists with the given id
    #[error("RFP not found: {id}")]
    RfpNotFound {
        /// The id that was looked up
        id: String,
    },

    /// No vendor exists with the given id
    #[error("Vendor not found: {id}")]
    VendorNotFound {
        /// The id that was looked up
        id: String,
    },

    /// No compliance document exists with the given id for the vendor
    #[error("Document {id} not found for vendor {vendor_id}")]
    DocumentNotFound {
        /// Owning vendor
        vendor_id: String,
        /// The id that was looked up
        id: String,
    },

    /// Input rejected before any write took place
    #[error("Validation failed: {message}")]
    Validation {
        /// Message suitable for showing to the operator
        message: String,
    },

    /// The stored document exists but cannot be read
    #[error("Stored document under key '{key}' is unreadable: {message}")]
    CorruptDocument {
        /// Storage key holding the document
        key: String,
        /// Parser message
        message: String,
    },

    /// The work-authorization exporter failed
    #[error("Failed to generate work authorization: {message}")]
    Export {
        /// Underlying exporter message
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::Validation`] from anything displayable.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for the lookup-miss variants that callers recover from locally.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RfpNotFound { .. }
                | Self::VendorNotFound { .. }
                | Self::DocumentNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::RfpNotFound { id: "RFP-001".into() }.is_not_found());
        assert!(
            Error::DocumentNotFound {
                vendor_id: "v1".into(),
                id: "MSA-2025".into()
            }
            .is_not_found()
        );
        assert!(!Error::validation("missing name").is_not_found());
    }

    #[test]
    fn test_export_message_includes_cause() {
        let err = Error::Export {
            message: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to generate work authorization: disk full"
        );
    }
}
