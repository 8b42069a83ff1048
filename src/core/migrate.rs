//! Load-time normalization of the stored portal document.
//!
//! Older builds of the portal wrote loosely shaped JSON: RFPs without an item
//! set, bids stored as `lines` with string prices, blank dates, missing
//! statuses. This module runs once over the raw JSON before it is turned into
//! typed records, coercing each known legacy shape and logging every change.
//! Anything it cannot coerce is reported as an error so the store can refuse
//! to load instead of guessing.

use crate::core::sequence::SequenceKind;
use crate::models::PortalDocument;
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use tracing::{debug, warn};

const EPOCH: &str = "1970-01-01T00:00:00Z";
const COLLECTIONS: [&str; 8] = [
    "projects",
    "models",
    "classificationCodes",
    "vendors",
    "documents",
    "rfps",
    "bids",
    "counters",
];

/// Normalizes a raw stored document and converts it into typed records.
///
/// # Errors
/// Returns a description of the problem when the value is not an object or
/// still does not match the schema after coercion.
pub fn normalize(mut raw: Value) -> Result<PortalDocument, String> {
    let Some(root) = raw.as_object_mut() else {
        return Err(format!("expected a JSON object, found {}", kind_of(&raw)));
    };

    let mut fixes = 0;
    for key in COLLECTIONS {
        if root.get(key).is_some_and(Value::is_null) {
            root.remove(key);
            warn!("Stored document had null '{}', using an empty value", key);
            fixes += 1;
        }
    }

    fixes += normalize_counters(root);

    if let Some(vendors) = root.get_mut("vendors").and_then(Value::as_array_mut) {
        for vendor in vendors.iter_mut().filter_map(Value::as_object_mut) {
            fixes += normalize_vendor(vendor);
        }
    }

    if let Some(documents) = root.get_mut("documents").and_then(Value::as_object_mut) {
        for (vendor_id, docs) in documents.iter_mut() {
            let Some(docs) = docs.as_array_mut() else {
                warn!("Documents for vendor {} were not a list, dropping them", vendor_id);
                *docs = json!([]);
                fixes += 1;
                continue;
            };
            for doc in docs.iter_mut().filter_map(Value::as_object_mut) {
                fixes += normalize_compliance_document(doc);
            }
        }
    }

    if let Some(rfps) = root.get_mut("rfps").and_then(Value::as_array_mut) {
        for rfp in rfps.iter_mut().filter_map(Value::as_object_mut) {
            fixes += normalize_rfp(rfp);
        }
    }

    if let Some(bids) = root.get_mut("bids").and_then(Value::as_array_mut) {
        let before = bids.len();
        bids.retain(|bid| {
            let attributed = ["rfpId", "vendorId"]
                .iter()
                .all(|key| bid.get(*key).and_then(Value::as_str).is_some());
            if !attributed {
                warn!("Dropping stored bid without rfpId/vendorId: {}", bid);
            }
            attributed
        });
        fixes += before - bids.len();

        for bid in bids.iter_mut().filter_map(Value::as_object_mut) {
            fixes += normalize_bid(bid);
        }
    }

    let mut document: PortalDocument =
        serde_json::from_value(raw).map_err(|e| format!("schema mismatch: {e}"))?;

    fixes += dedupe_bids(&mut document);
    fixes += reconcile_counters(&mut document)?;

    if fixes > 0 {
        warn!("Normalized {} legacy field(s) in the stored document", fixes);
    } else {
        debug!("Stored document needed no normalization");
    }
    Ok(document)
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn empty_items() -> Value {
    json!({ "globals": [], "models": {}, "unitRates": [] })
}

fn record_id(record: &Map<String, Value>) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<no id>")
        .to_string()
}

fn is_timestamp(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
}

/// Removes `null` values for keys whose typed field has a default.
fn strip_nulls(record: &mut Map<String, Value>, keys: &[&str]) -> usize {
    let mut removed = 0;
    for key in keys {
        if record.get(*key).is_some_and(Value::is_null) {
            record.remove(*key);
            removed += 1;
        }
    }
    removed
}

/// Blank or unreadable `YYYY-MM-DD` dates become absent.
fn normalize_date(record: &mut Map<String, Value>, key: &str) -> usize {
    let Some(Value::String(text)) = record.get(key) else {
        return 0;
    };
    if NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").is_ok() {
        if text.trim().len() == text.len() {
            return 0;
        }
        let trimmed = text.trim().to_string();
        record.insert(key.to_string(), Value::String(trimmed));
        return 1;
    }
    if !text.trim().is_empty() {
        warn!(
            "Dropping unreadable {} '{}' on record {}",
            key,
            text,
            record_id(record)
        );
    }
    record.remove(key);
    1
}

fn normalize_counters(root: &mut Map<String, Value>) -> usize {
    let Some(counters) = root.get_mut("counters") else {
        return 0;
    };
    let Some(counters) = counters.as_object_mut() else {
        warn!("Stored counters were not an object, resetting them");
        root.remove("counters");
        return 1;
    };

    let mut fixes = 0;
    for key in ["rfp", "wa", "bid"] {
        if counters.get(key).and_then(Value::as_u64).is_none() {
            let coerced = counters
                .get(key)
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite() && *n >= 1.0)
                .map_or(1, |n| n as u64);
            warn!("Counter '{}' was missing or invalid, using {}", key, coerced);
            counters.insert(key.to_string(), json!(coerced));
            fixes += 1;
        }
    }
    fixes
}

fn normalize_vendor(vendor: &mut Map<String, Value>) -> usize {
    let mut fixes = strip_nulls(
        vendor,
        &[
            "trade",
            "city",
            "email",
            "contact",
            "phone",
            "classificationCodes",
            "notes",
            "status",
            "rating",
        ],
    );

    if let Some(Value::String(rating)) = vendor.get("rating") {
        let coerced = rating.trim().parse::<f64>().unwrap_or(0.0);
        warn!(
            "Vendor {} had a text rating '{}', storing {}",
            record_id(vendor),
            rating,
            coerced
        );
        vendor.insert("rating".into(), json!(coerced));
        fixes += 1;
    }
    if vendor.get("name").is_none() {
        warn!("Vendor {} had no name", record_id(vendor));
        vendor.insert("name".into(), json!(""));
        fixes += 1;
    }
    fixes
}

fn normalize_compliance_document(doc: &mut Map<String, Value>) -> usize {
    let mut fixes = strip_nulls(doc, &["projects", "models", "files", "supersedes", "items"]);
    fixes += normalize_date(doc, "validFrom");
    fixes += normalize_date(doc, "validTo");
    if let Some(Value::Array(items)) = doc.get_mut("items") {
        fixes += coerce_lines(items);
    }
    fixes
}

fn normalize_rfp(rfp: &mut Map<String, Value>) -> usize {
    let id = record_id(rfp);
    let mut fixes = strip_nulls(rfp, &["projects", "models", "invitedVendorIds"]);

    match rfp.get_mut("items") {
        Some(Value::Object(items)) => {
            fixes += strip_nulls(items, &["globals", "models", "unitRates"]);
        }
        _ => {
            warn!("RFP {} had no item set, using an empty one", id);
            rfp.insert("items".into(), empty_items());
            fixes += 1;
        }
    }

    let blank_title = rfp
        .get("title")
        .and_then(Value::as_str)
        .is_none_or(|title| title.trim().is_empty());
    if blank_title {
        rfp.insert("title".into(), Value::String(id.clone()));
        fixes += 1;
    }

    fixes += normalize_date(rfp, "dueDate");

    if let Some(awarded_at) = rfp.get("awardedAt").filter(|v| !v.is_null()) {
        if !awarded_at.as_str().is_some_and(is_timestamp) {
            warn!("RFP {} had an unreadable award time {}, dropping it", id, awarded_at);
            rfp.remove("awardedAt");
            fixes += 1;
        }
    }

    if rfp.remove("bids").is_some() {
        debug!("Dropped unused embedded bid list on RFP {}", id);
    }
    fixes
}

fn normalize_bid(bid: &mut Map<String, Value>) -> usize {
    let id = record_id(bid);
    let mut fixes = 0;

    if !bid.get("items").is_some_and(Value::is_object) {
        let items = bid.remove("lines").map_or_else(empty_items, lines_to_items);
        warn!("Bid {} used the legacy line layout, converted to an item set", id);
        bid.insert("items".into(), items);
        fixes += 1;
    }

    if let Some(Value::Object(items)) = bid.get_mut("items") {
        fixes += coerce_item_prices(items);
    }

    if !bid.get("status").is_some_and(Value::is_string) {
        bid.insert("status".into(), json!("submitted"));
        fixes += 1;
    }

    let submitted = bid
        .get("submittedAt")
        .and_then(Value::as_str)
        .is_some_and(is_timestamp);
    if !submitted {
        warn!("Bid {} had no usable submission time, using the epoch", id);
        bid.insert("submittedAt".into(), json!(EPOCH));
        fixes += 1;
    }
    fixes
}

/// Converts `{globals, models: [{model, items}], unitRates}` into an item set value.
fn lines_to_items(lines: Value) -> Value {
    let Value::Object(mut lines) = lines else {
        return empty_items();
    };

    let models = match lines.remove("models") {
        Some(Value::Array(groups)) => {
            let mut by_model = Map::new();
            for group in groups {
                if let Some(model) = group.get("model").and_then(Value::as_str) {
                    let items = group.get("items").cloned().unwrap_or_else(|| json!([]));
                    by_model.insert(model.to_string(), items);
                }
            }
            Value::Object(by_model)
        }
        Some(Value::Object(by_model)) => Value::Object(by_model),
        _ => json!({}),
    };

    json!({
        "globals": lines.remove("globals").unwrap_or_else(|| json!([])),
        "models": models,
        "unitRates": lines.remove("unitRates").unwrap_or_else(|| json!([])),
    })
}

fn coerce_item_prices(items: &mut Map<String, Value>) -> usize {
    let mut fixes = 0;
    for key in ["globals", "unitRates"] {
        match items.get_mut(key) {
            Some(Value::Array(lines)) => fixes += coerce_lines(lines),
            Some(_) => {
                items.insert(key.to_string(), json!([]));
                fixes += 1;
            }
            None => {}
        }
    }

    match items.get_mut("models") {
        Some(Value::Object(models)) => {
            for lines in models.values_mut() {
                match lines {
                    Value::Array(entries) => fixes += coerce_lines(entries),
                    other => {
                        *other = json!([]);
                        fixes += 1;
                    }
                }
            }
        }
        Some(_) => {
            items.insert("models".into(), json!({}));
            fixes += 1;
        }
        None => {}
    }
    fixes
}

fn coerce_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    price.filter(|p| p.is_finite())
}

/// Turns text prices into numbers and drops lines without a usable name or price.
fn coerce_lines(lines: &mut Vec<Value>) -> usize {
    let before = lines.len();
    let mut converted = 0;
    lines.retain_mut(|line| {
        let Some(line) = line.as_object_mut() else {
            return false;
        };
        if !line.get("name").is_some_and(Value::is_string) {
            return false;
        }
        let Some(price) = line.get("price").and_then(coerce_price) else {
            return false;
        };
        if !line.get("price").is_some_and(Value::is_number) {
            line.insert("price".into(), json!(price));
            converted += 1;
        }
        true
    });

    let dropped = before - lines.len();
    if dropped > 0 {
        warn!("Dropped {} line(s) without a usable name or price", dropped);
    }
    converted + dropped
}

/// Keeps only the most recent bid per (RFP, vendor).
fn dedupe_bids(document: &mut PortalDocument) -> usize {
    let before = document.bids.len();
    let mut seen = HashSet::new();
    let mut kept: Vec<_> = document
        .bids
        .drain(..)
        .rev()
        .filter(|bid| seen.insert((bid.rfp_id.clone(), bid.vendor_id.clone())))
        .collect();
    kept.reverse();
    document.bids = kept;

    let removed = before - document.bids.len();
    if removed > 0 {
        warn!(
            "Removed {} superseded duplicate bid(s) for the same RFP and vendor",
            removed
        );
    }
    removed
}

/// Raises counters above every id already in use so minting never collides.
///
/// Fails when a stored id is the largest number a counter can hold.
fn reconcile_counters(document: &mut PortalDocument) -> Result<usize, String> {
    let max_rfp = document
        .rfps
        .iter()
        .filter_map(|rfp| SequenceKind::Rfp.parse(&rfp.id))
        .max();
    let max_wa = document
        .rfps
        .iter()
        .filter_map(|rfp| rfp.work_authorization.as_deref())
        .filter_map(|wa| SequenceKind::WorkAuthorization.parse(wa))
        .max();
    let max_bid = document
        .bids
        .iter()
        .filter_map(|bid| SequenceKind::Bid.parse(&bid.id))
        .max();

    let mut fixes = 0;
    for (kind, used) in [
        (SequenceKind::Rfp, max_rfp),
        (SequenceKind::WorkAuthorization, max_wa),
        (SequenceKind::Bid, max_bid),
    ] {
        let Some(used) = used else {
            continue;
        };
        let raised = document
            .counters
            .ensure_above(kind, used)
            .ok_or_else(|| {
                format!(
                    "stored {} id {} leaves no room for new ids",
                    kind,
                    kind.format(used)
                )
            })?;
        if raised {
            warn!(
                "Counter '{}' was behind stored ids, raised to {}",
                kind,
                document.counters.peek(kind)
            );
            fixes += 1;
        }
    }
    Ok(fixes)
}
