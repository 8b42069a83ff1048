//! Shared test utilities for the procurement portal.
//!
//! This module provides common helpers for setting up an in-memory store,
//! building forms with sensible defaults, and capturing exported work
//! authorizations.

use crate::{
    config::SeedConfig,
    config::portal::DEFAULT_STORAGE_KEY,
    core::{
        bid::submit_bid,
        export::{ExportArtifact, WorkAuthorizationExporter, WorkAuthorizationPackage, file_name},
        rfp::create_rfp,
        store::Store,
    },
    errors::{Error, Result},
    models::{Category, ItemSet, PricedItem, RfpForm, RfpItem, VendorForm, VendorStatus},
};
use sea_orm::DatabaseConnection;
use std::cell::RefCell;

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A store over a fresh database using the built-in seed. Nothing is written yet.
pub async fn setup_test_store() -> Result<Store> {
    let db = setup_test_db().await?;
    Ok(Store::new(
        db,
        DEFAULT_STORAGE_KEY,
        SeedConfig::default().to_document(),
    ))
}

/// A vendor form with every required field filled in.
///
/// # Defaults
/// * `trade`: "Framing"
/// * `contact`: "Alex Morgan"
/// * `email`: "bids@example.com"
/// * `status`: active
pub fn test_vendor_form(name: &str) -> VendorForm {
    VendorForm {
        name: name.to_string(),
        trade: "Framing".to_string(),
        city: "Edmonton".to_string(),
        contact: "Alex Morgan".to_string(),
        email: "bids@example.com".to_string(),
        phone: "(780) 555-0100".to_string(),
        classification_codes: vec!["FRM-100".to_string()],
        notes: String::new(),
        status: VendorStatus::Active,
    }
}

/// An RFP form for the Glenridding project inviting `invited`.
///
/// # Lines
/// * globals: Footings, Foundation Walls
/// * unit rates: Concrete (m³)
pub fn test_rfp_form(invited: &[&str]) -> RfpForm {
    let mut items = ItemSet::default();
    items.push(Category::Globals, None, RfpItem::new("Footings"));
    items.push(Category::Globals, None, RfpItem::new("Foundation Walls"));
    items.push(Category::UnitRates, None, RfpItem::new("Concrete (m³)"));

    RfpForm {
        title: "Foundations - Glenridding".to_string(),
        projects: vec!["Glenridding".to_string()],
        models: Vec::new(),
        due_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 15),
        items,
        invited_vendor_ids: invited.iter().map(ToString::to_string).collect(),
    }
}

/// Sets up a store holding one RFP that invites v1 and v2.
/// Returns (store, `rfp_id`).
pub async fn setup_with_rfp() -> Result<(Store, String)> {
    let store = setup_test_store().await?;
    let rfp = create_rfp(&store, &test_rfp_form(&["v1", "v2"])).await?;
    Ok((store, rfp.id))
}

/// Sets up an RFP with bids from v1 (total 600) and v2 (total 605).
///
/// v2 is cheapest on Footings and Concrete, v1 on Foundation Walls.
pub async fn setup_with_bids() -> Result<(Store, String)> {
    let (store, rfp_id) = setup_with_rfp().await?;

    for (vendor_id, footings, walls, concrete) in [("v1", 120.0, 300.0, 180.0), ("v2", 110.0, 320.0, 175.0)] {
        let mut items = ItemSet::default();
        items.push(Category::Globals, None, PricedItem::new("Footings", footings));
        items.push(
            Category::Globals,
            None,
            PricedItem::new("Foundation Walls", walls),
        );
        items.push(
            Category::UnitRates,
            None,
            PricedItem::new("Concrete (m³)", concrete),
        );
        submit_bid(&store, &rfp_id, vendor_id, items).await?;
    }

    Ok((store, rfp_id))
}

/// Exporter that keeps packages in memory, or fails every export.
#[derive(Debug, Default)]
pub struct RecordingExporter {
    packages: RefCell<Vec<WorkAuthorizationPackage>>,
    fail: bool,
}

impl RecordingExporter {
    /// An exporter whose every export fails.
    pub fn failing() -> Self {
        Self {
            packages: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    /// Packages exported so far.
    pub fn packages(&self) -> Vec<WorkAuthorizationPackage> {
        self.packages.borrow().clone()
    }
}

impl WorkAuthorizationExporter for RecordingExporter {
    fn export(&self, package: &WorkAuthorizationPackage) -> Result<ExportArtifact> {
        if self.fail {
            return Err(Error::Export {
                message: "renderer unavailable".to_string(),
            });
        }
        self.packages.borrow_mut().push(package.clone());
        Ok(ExportArtifact {
            file_name: file_name(&package.wa_number, "txt"),
            path: None,
        })
    }
}
