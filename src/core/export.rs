//! Work-authorization export.
//!
//! The award engine hands a [`WorkAuthorizationPackage`] to whatever implements
//! [`WorkAuthorizationExporter`]. The bundled [`TextExporter`] renders a plain
//! text document into a directory.

use crate::{
    core::report::format_currency,
    errors::{Error, Result},
    models::{ItemSet, PricedItem, Rfp, Vendor},
};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const NOT_PROVIDED: &str = "Not Provided";
const NOT_SPECIFIED: &str = "Not Specified";

const TERMS: [&str; 5] = [
    "1. This work authorization is valid for 30 days from the date of issue.",
    "2. Any changes to the scope of work must be approved in writing.",
    "3. Invoices must reference this work authorization number.",
    "4. Payment terms: Net 30 days from receipt of invoice.",
    "5. All work must be completed in accordance with local building codes and regulations.",
];

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Vendor details printed on a work authorization, with blanks filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSnapshot {
    /// Vendor id
    pub id: String,
    /// Company name
    pub name: String,
    /// Contact person
    pub contact: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Trade, `General` when blank
    pub trade: String,
}

impl From<&Vendor> for VendorSnapshot {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id.clone(),
            name: or_default(&vendor.name, NOT_PROVIDED),
            contact: or_default(&vendor.contact, NOT_PROVIDED),
            email: or_default(&vendor.email, NOT_PROVIDED),
            phone: or_default(&vendor.phone, NOT_PROVIDED),
            trade: or_default(&vendor.trade, "General"),
        }
    }
}

/// RFP details printed on a work authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfpSnapshot {
    /// RFP id
    pub id: String,
    /// RFP title
    pub title: String,
    /// Projects covered
    pub projects: Vec<String>,
    /// Due date, if one was set
    pub due_date: Option<NaiveDate>,
}

impl From<&Rfp> for RfpSnapshot {
    fn from(rfp: &Rfp) -> Self {
        Self {
            id: rfp.id.clone(),
            title: rfp.title.clone(),
            projects: rfp.projects.clone(),
            due_date: rfp.due_date,
        }
    }
}

/// Everything an exporter needs to render one work authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkAuthorizationPackage {
    /// Awarded vendor
    pub vendor: VendorSnapshot,
    /// RFP being authorized
    pub rfp: RfpSnapshot,
    /// Authorized lines and prices
    pub selections: ItemSet<PricedItem>,
    /// `WA-NNN` number
    pub wa_number: String,
    /// Issue date
    pub issued_on: NaiveDate,
}

impl WorkAuthorizationPackage {
    /// Total authorized amount.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.selections.total()
    }
}

/// Where an exported work authorization ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// File name of the rendered document
    pub file_name: String,
    /// Full path when the exporter wrote to disk
    pub path: Option<PathBuf>,
}

/// Renders a work authorization to some external form.
///
/// Implementations report failures as [`Error::Export`]; the award engine only
/// records the WA number after a successful export.
pub trait WorkAuthorizationExporter {
    /// Renders `package`.
    fn export(&self, package: &WorkAuthorizationPackage) -> Result<ExportArtifact>;
}

/// File name used for a work authorization document.
#[must_use]
pub fn file_name(wa_number: &str, extension: &str) -> String {
    format!("Work_Authorization_{wa_number}.{extension}")
}

/// Writes work authorizations as text files into a directory.
#[derive(Debug, Clone)]
pub struct TextExporter {
    dir: PathBuf,
}

impl TextExporter {
    /// Exporter writing into `dir`, which is created on first export.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders the document body.
    #[must_use]
    pub fn render(package: &WorkAuthorizationPackage) -> String {
        let mut out = Vec::new();
        let vendor = &package.vendor;
        let rfp = &package.rfp;

        out.push("WORK AUTHORIZATION".to_string());
        out.push(format!(
            "Authorization #: {}    Date: {}",
            package.wa_number,
            package.issued_on.format("%Y-%m-%d")
        ));
        out.push(String::new());

        out.push("Vendor Information:".to_string());
        out.push(format!("  Name: {}", vendor.name));
        out.push(format!("  Contact: {}", vendor.contact));
        out.push(format!("  Email: {}", vendor.email));
        out.push(format!("  Phone: {}", vendor.phone));
        out.push(format!("  Trade: {}", vendor.trade));
        out.push(String::new());

        let projects = if rfp.projects.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            rfp.projects.join(", ")
        };
        let due = rfp
            .due_date
            .map_or_else(|| NOT_SPECIFIED.to_string(), |d| d.format("%Y-%m-%d").to_string());
        out.push("Project Information:".to_string());
        out.push(format!("  Projects: {projects}"));
        out.push(format!("  RFP #: {}", or_default(&rfp.id, "N/A")));
        out.push(format!("  Title: {}", rfp.title));
        out.push(format!("  Due Date: {due}"));
        out.push(String::new());

        out.push("AUTHORIZED ITEMS".to_string());
        let selections = &package.selections;
        push_section(&mut out, "Global Items:", &selections.globals);
        for (model, items) in &selections.models {
            push_section(&mut out, &format!("Model: {model}"), items);
        }
        push_section(&mut out, "Unit Rates:", &selections.unit_rates);
        out.push(String::new());

        out.push(format!(
            "Total Authorized Amount: {}",
            format_currency(package.total())
        ));
        out.push(String::new());

        out.push("Terms and Conditions:".to_string());
        out.extend(TERMS.iter().map(|term| format!("  {term}")));
        out.push(String::new());

        out.push("________________________________    ________________________________".to_string());
        out.push("Authorized Company Representative    Vendor Representative".to_string());
        out.push(String::new());
        out.push("Signature          Date               Signature          Date".to_string());

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

fn push_section(out: &mut Vec<String>, title: &str, items: &[PricedItem]) {
    if items.is_empty() {
        return;
    }
    out.push(String::new());
    out.push(title.to_string());
    for item in items {
        out.push(format!("  {:<40} {:>14}", item.name, format_currency(item.price)));
    }
}

impl WorkAuthorizationExporter for TextExporter {
    fn export(&self, package: &WorkAuthorizationPackage) -> Result<ExportArtifact> {
        let name = file_name(&package.wa_number, "txt");
        let path = self.dir.join(&name);

        fs::create_dir_all(&self.dir).map_err(|e| Error::Export {
            message: format!("cannot create {}: {e}", self.dir.display()),
        })?;
        fs::write(&path, Self::render(package)).map_err(|e| Error::Export {
            message: format!("cannot write {}: {e}", path.display()),
        })?;

        info!(
            "Exported {} for {} to {}",
            package.wa_number,
            package.vendor.name,
            path.display()
        );
        Ok(ExportArtifact {
            file_name: name,
            path: Some(path),
        })
    }
}
