//! Vendor directory business logic - add, edit, search and status changes.
//!
//! Vendors are never hard-deleted; retiring one means setting its status to
//! inactive. Every write goes through [`Store::update`].

use crate::{
    core::store::Store,
    errors::{Error, Result},
    models::{Vendor, VendorForm, VendorStatus},
};
use rand::Rng;
use tracing::info;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a short random id such as `v-k3j9x0a`.
#[must_use]
pub fn uid(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..7)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("{prefix}-{suffix}")
}

/// Checks the required vendor fields and returns a trimmed copy of the form.
fn validate_form(form: &VendorForm) -> Result<VendorForm> {
    let required = [
        ("name", &form.name),
        ("trade", &form.trade),
        ("contact", &form.contact),
        ("email", &form.email),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }

    let mut codes: Vec<String> = Vec::new();
    for code in &form.classification_codes {
        let code = code.trim();
        if !code.is_empty() && !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }

    Ok(VendorForm {
        name: form.name.trim().to_string(),
        trade: form.trade.trim().to_string(),
        city: form.city.trim().to_string(),
        contact: form.contact.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        classification_codes: codes,
        notes: form.notes.trim().to_string(),
        status: form.status,
    })
}

/// Adds a vendor to the directory.
///
/// Name, trade, contact and email are required; all text is trimmed and
/// duplicate classification codes are dropped. New vendors start with a zero rating.
///
/// # Errors
/// Returns [`Error::Validation`] when a required field is blank.
pub async fn add_vendor(store: &Store, form: &VendorForm) -> Result<Vendor> {
    let form = validate_form(form)?;

    let vendor = store
        .update(|doc| {
            let mut id = uid("v");
            while doc.vendor(&id).is_some() {
                id = uid("v");
            }
            let vendor = Vendor {
                id,
                name: form.name,
                trade: form.trade,
                city: form.city,
                email: form.email,
                contact: form.contact,
                phone: form.phone,
                classification_codes: form.classification_codes,
                notes: form.notes,
                status: form.status,
                rating: 0.0,
            };
            doc.vendors.push(vendor.clone());
            Ok(vendor)
        })
        .await?;

    info!("Added vendor {} ({})", vendor.id, vendor.name);
    Ok(vendor)
}

/// Replaces a vendor's editable fields; the id and rating are kept.
///
/// # Errors
/// [`Error::Validation`] for blank required fields, [`Error::VendorNotFound`]
/// when the id is unknown.
pub async fn update_vendor(store: &Store, vendor_id: &str, form: &VendorForm) -> Result<Vendor> {
    let form = validate_form(form)?;

    let vendor = store
        .update(|doc| {
            let vendor = doc
                .vendors
                .iter_mut()
                .find(|v| v.id == vendor_id)
                .ok_or_else(|| Error::VendorNotFound {
                    id: vendor_id.to_string(),
                })?;
            vendor.name = form.name;
            vendor.trade = form.trade;
            vendor.city = form.city;
            vendor.email = form.email;
            vendor.contact = form.contact;
            vendor.phone = form.phone;
            vendor.classification_codes = form.classification_codes;
            vendor.notes = form.notes;
            vendor.status = form.status;
            Ok(vendor.clone())
        })
        .await?;

    info!("Updated vendor {}", vendor.id);
    Ok(vendor)
}

/// Changes a vendor's directory status.
pub async fn set_vendor_status(
    store: &Store,
    vendor_id: &str,
    status: VendorStatus,
) -> Result<Vendor> {
    let vendor = store
        .update(|doc| {
            let vendor = doc
                .vendors
                .iter_mut()
                .find(|v| v.id == vendor_id)
                .ok_or_else(|| Error::VendorNotFound {
                    id: vendor_id.to_string(),
                })?;
            vendor.status = status;
            Ok(vendor.clone())
        })
        .await?;

    info!("Vendor {} is now {}", vendor.id, vendor.status);
    Ok(vendor)
}

/// Finds a vendor by id.
pub async fn get_vendor(store: &Store, vendor_id: &str) -> Result<Option<Vendor>> {
    Ok(store.load().await?.vendor(vendor_id).cloned())
}

/// Lists every vendor in directory order.
pub async fn list_vendors(store: &Store) -> Result<Vec<Vendor>> {
    Ok(store.load().await?.vendors)
}

/// Case-insensitive search on vendor name or classification code.
///
/// A blank term returns the whole directory.
pub async fn search_vendors(store: &Store, term: &str) -> Result<Vec<Vendor>> {
    let needle = term.trim().to_lowercase();
    let vendors = store.load().await?.vendors;
    if needle.is_empty() {
        return Ok(vendors);
    }

    Ok(vendors
        .into_iter()
        .filter(|v| {
            v.name.to_lowercase().contains(&needle)
                || v
                    .classification_codes
                    .iter()
                    .any(|code| code.to_lowercase().contains(&needle))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_uid_format() {
        let id = uid("v");
        assert!(id.starts_with("v-"));
        assert_eq!(id.len(), 9);
        assert!(id[2..].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn test_add_vendor_validation() -> Result<()> {
        let store = setup_test_store().await?;

        let mut form = test_vendor_form("Ridge Framing");
        form.email = "   ".to_string();
        let result = add_vendor(&store, &form).await;
        match result {
            Err(Error::Validation { message }) => assert!(message.contains("email")),
            other => panic!("expected validation error, got {other:?}"),
        }

        // Nothing was written
        assert!(store.read_raw().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_vendor_trims_and_persists() -> Result<()> {
        let store = setup_test_store().await?;

        let mut form = test_vendor_form("  Ridge Framing ");
        form.classification_codes = vec!["FRM-100".into(), " FRM-100".into(), "FRM-200".into()];
        let vendor = add_vendor(&store, &form).await?;

        assert_eq!(vendor.name, "Ridge Framing");
        assert_eq!(vendor.rating, 0.0);
        assert_eq!(vendor.classification_codes, vec!["FRM-100", "FRM-200"]);
        assert!(vendor.id.starts_with("v-"));

        let stored = get_vendor(&store, &vendor.id).await?.unwrap();
        assert_eq!(stored, vendor);
        assert_eq!(list_vendors(&store).await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_vendor_keeps_id_and_rating() -> Result<()> {
        let store = setup_test_store().await?;

        let mut form = test_vendor_form("BlueSky Concrete & Forming");
        form.status = VendorStatus::Pending;
        let vendor = update_vendor(&store, "v1", &form).await?;

        assert_eq!(vendor.id, "v1");
        assert_eq!(vendor.rating, 4.5);
        assert_eq!(vendor.name, "BlueSky Concrete & Forming");
        assert_eq!(vendor.status, VendorStatus::Pending);

        let missing = update_vendor(&store, "v404", &form).await;
        assert!(matches!(missing, Err(Error::VendorNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_vendor_status() -> Result<()> {
        let store = setup_test_store().await?;

        set_vendor_status(&store, "v3", VendorStatus::Inactive).await?;
        let vendor = get_vendor(&store, "v3").await?.unwrap();
        assert_eq!(vendor.status, VendorStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_by_name_or_code() -> Result<()> {
        let store = setup_test_store().await?;

        let by_name = search_vendors(&store, "northpeak").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "v2");

        let by_code = search_vendors(&store, "hvc-2").await?;
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].id, "v3");

        assert_eq!(search_vendors(&store, "  ").await?.len(), 3);
        assert!(search_vendors(&store, "plumbing").await?.is_empty());
        Ok(())
    }
}
