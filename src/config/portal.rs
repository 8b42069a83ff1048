//! Portal configuration loading from config.toml
//!
//! The configuration names the storage key, the directory work authorizations
//! are exported to, the seed document used when storage is empty, and the
//! line-item catalog offered when building an RFP. Every section is optional;
//! missing sections fall back to the built-in defaults.

use crate::errors::{Error, Result};
use crate::models::{
    ComplianceDocument, Counters, DocumentType, ItemSet, PortalDocument, PricedItem, RfpItem,
    Vendor, VendorStatus,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Storage key used when the configuration does not name one
pub const DEFAULT_STORAGE_KEY: &str = "rohit-procurement-fresh-v1";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Key the portal document is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory the text exporter writes work authorizations to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Document written when storage is empty
    #[serde(default)]
    pub seed: SeedConfig,
    /// Line items offered when building an RFP
    #[serde(default)]
    pub catalog: Catalog,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            export_dir: default_export_dir(),
            seed: SeedConfig::default(),
            catalog: Catalog::default(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

/// Seed data for a fresh store
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Project names
    #[serde(default)]
    pub projects: Vec<String>,
    /// House model names
    #[serde(default)]
    pub models: Vec<String>,
    /// Classification codes
    #[serde(default)]
    pub classification_codes: Vec<String>,
    /// Initial vendor directory
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Initial compliance documents keyed by vendor id
    #[serde(default)]
    pub documents: BTreeMap<String, Vec<ComplianceDocument>>,
    /// Initial counter values
    #[serde(default)]
    pub counters: Counters,
}

impl SeedConfig {
    /// Builds the portal document this seed describes.
    #[must_use]
    pub fn to_document(&self) -> PortalDocument {
        PortalDocument {
            projects: self.projects.clone(),
            models: self.models.clone(),
            classification_codes: self.classification_codes.clone(),
            vendors: self.vendors.clone(),
            documents: self.documents.clone(),
            rfps: Vec::new(),
            bids: Vec::new(),
            counters: self.counters,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(ToString::to_string).collect::<Vec<_>>();

        let vendors = vec![
            Vendor {
                id: "v1".into(),
                name: "BlueSky Concrete Ltd.".into(),
                trade: "Concrete".into(),
                city: "Edmonton".into(),
                email: "concrete@bluesky.ca".into(),
                contact: "John Smith".into(),
                phone: "(780) 123-4567".into(),
                classification_codes: strings(&["CON-100", "CON-200"]),
                notes: "Specializes in foundation work".into(),
                status: VendorStatus::Active,
                rating: 4.5,
            },
            Vendor {
                id: "v2".into(),
                name: "NorthPeak Electrical".into(),
                trade: "Electrical".into(),
                city: "Calgary".into(),
                email: "info@northpeakelec.com".into(),
                contact: "Sarah Johnson".into(),
                phone: "(403) 987-6543".into(),
                classification_codes: strings(&["ELE-100", "ELE-200", "ELE-300"]),
                notes: "24/7 emergency service available".into(),
                status: VendorStatus::Active,
                rating: 4.8,
            },
            Vendor {
                id: "v3".into(),
                name: "Polar HVAC".into(),
                trade: "HVAC".into(),
                city: "Edmonton".into(),
                email: "service@polarhvac.ca".into(),
                contact: "Mike Wilson".into(),
                phone: "(780) 555-1234".into(),
                classification_codes: strings(&["HVC-100", "HVC-200"]),
                notes: "Specializes in commercial HVAC systems".into(),
                status: VendorStatus::Active,
                rating: 4.2,
            },
        ];

        let mut documents = BTreeMap::new();
        documents.insert(
            "v1".to_string(),
            vec![
                ComplianceDocument {
                    id: "wa-001".into(),
                    doc_type: DocumentType::Wa,
                    projects: strings(&["Glenridding"]),
                    models: strings(&["Townhome A"]),
                    valid_from: NaiveDate::from_ymd_opt(2025, 6, 1),
                    valid_to: NaiveDate::from_ymd_opt(2025, 12, 31),
                    files: Vec::new(),
                    supersedes: Vec::new(),
                    superseded_by: None,
                    items: vec![PricedItem::new("Footings", 120.0)],
                },
                ComplianceDocument {
                    id: "MSA-2025".into(),
                    doc_type: DocumentType::Msa,
                    projects: Vec::new(),
                    models: Vec::new(),
                    valid_from: NaiveDate::from_ymd_opt(2025, 1, 1),
                    valid_to: NaiveDate::from_ymd_opt(2026, 12, 31),
                    files: Vec::new(),
                    supersedes: Vec::new(),
                    superseded_by: None,
                    items: Vec::new(),
                },
            ],
        );

        Self {
            projects: strings(&[
                "Glenridding",
                "Arbours of Keswick",
                "Hawks Ridge",
                "Aurora Heights",
            ]),
            models: strings(&["Townhome A", "Townhome B", "SF24", "SF28"]),
            classification_codes: strings(&[
                "CON-100", "CON-200", "CON-300", "ELE-100", "ELE-200", "ELE-300", "HVC-100",
                "HVC-200", "HVC-300", "PLM-100", "PLM-200", "PLM-300", "FRM-100", "FRM-200",
                "FRM-300",
            ]),
            vendors,
            documents,
            counters: Counters {
                rfp: 1,
                wa: 2,
                bid: 1,
            },
        }
    }
}

/// Line items an RFP can request, grouped the same way as an item set
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    /// Global lines
    #[serde(default)]
    pub globals: Vec<String>,
    /// Per-model lines keyed by model name
    #[serde(default)]
    pub models: BTreeMap<String, Vec<String>>,
    /// Unit rates
    #[serde(default)]
    pub unit_rates: Vec<String>,
}

impl Catalog {
    /// Builds the full item set for an RFP covering `models`.
    ///
    /// Per-model lines are only included for the listed models.
    #[must_use]
    pub fn items_for(&self, models: &[String]) -> ItemSet<RfpItem> {
        let to_items = |names: &[String]| names.iter().map(RfpItem::new).collect::<Vec<_>>();
        ItemSet {
            globals: to_items(&self.globals),
            models: self
                .models
                .iter()
                .filter(|(model, _)| models.contains(model))
                .map(|(model, names)| (model.clone(), to_items(names)))
                .collect(),
            unit_rates: to_items(&self.unit_rates),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(ToString::to_string).collect::<Vec<_>>();
        let mut models = BTreeMap::new();
        models.insert(
            "Townhome A".to_string(),
            strings(&["Kitchen Rough-in", "Bathroom Rough-in"]),
        );
        models.insert(
            "Townhome B".to_string(),
            strings(&["Kitchen Rough-in", "Basement Rough-in"]),
        );
        models.insert("SF24".to_string(), strings(&["Garage"]));
        models.insert("SF28".to_string(), strings(&["Basement Dev."]));

        Self {
            globals: strings(&[
                "Footings",
                "Foundation Walls",
                "Slab on Grade",
                "Rebar",
                "Vapor Barrier",
            ]),
            models,
            unit_rates: strings(&["Concrete (m³)", "Rebar (kg)", "Formwork (m²)"]),
        }
    }
}

/// Loads portal configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PortalConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `PORTAL_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_default_config() -> Result<PortalConfig> {
    let path =
        std::env::var("PORTAL_CONFIG").map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from);

    if !path.exists() {
        tracing::warn!(
            "No configuration file at {}, using built-in defaults",
            path.display()
        );
        return Ok(PortalConfig::default());
    }

    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::LineRef;

    #[test]
    fn test_parse_portal_config() {
        let toml_str = r#"
            storage_key = "test-key"
            export_dir = "out"

            [seed]
            projects = ["Glenridding"]
            models = ["SF24"]

            [seed.counters]
            rfp = 7
            wa = 3
            bid = 12

            [[seed.vendors]]
            id = "v9"
            name = "Ridge Framing"
            trade = "Framing"
            classificationCodes = ["FRM-100"]
            rating = 3.5

            [catalog]
            globals = ["Footings"]
            unit_rates = ["Rebar (kg)"]

            [catalog.models]
            SF24 = ["Garage"]
        "#;

        let config: PortalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage_key, "test-key");
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.seed.counters.rfp, 7);
        assert_eq!(config.seed.vendors.len(), 1);
        assert_eq!(config.seed.vendors[0].status, VendorStatus::Active);
        assert_eq!(config.seed.vendors[0].rating, 3.5);
        assert_eq!(config.catalog.models["SF24"], vec!["Garage".to_string()]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: PortalConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.export_dir, PathBuf::from("exports"));
        assert_eq!(config.seed.vendors.len(), 3);
        assert_eq!(config.seed.counters.wa, 2);
        assert_eq!(config.catalog.globals.len(), 5);

        // An explicit but empty section replaces the built-in seed
        let config: PortalConfig = toml::from_str("[seed]").unwrap();
        assert!(config.seed.vendors.is_empty());
        assert_eq!(config.seed.counters, Counters::default());
    }

    #[test]
    fn test_catalog_items_for_selected_models() {
        let catalog = Catalog::default();
        let items = catalog.items_for(&["SF24".to_string()]);
        assert_eq!(items.globals.len(), 5);
        assert!(items.contains(&LineRef::model("SF24", "Garage")));
        assert!(!items.models.contains_key("SF28"));
        assert_eq!(items.unit_rates.len(), 3);
    }

    #[test]
    fn test_default_seed_document() {
        let doc = SeedConfig::default().to_document();
        assert_eq!(doc.vendors[0].id, "v1");
        assert_eq!(doc.documents["v1"].len(), 2);
        assert!(doc.rfps.is_empty());
        assert_eq!(doc.counters.rfp, 1);
    }
}
