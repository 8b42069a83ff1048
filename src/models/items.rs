//! Line items shared by RFPs, bids and work authorizations.
//!
//! Every item set has the same three categories: global lines, per-model lines
//! keyed by model name, and unit rates. RFPs carry unpriced lines, bids and
//! selections carry priced ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category a line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Lines that apply across the whole RFP
    Globals,
    /// Lines scoped to one house model
    Models,
    /// Per-unit rates
    UnitRates,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Globals => write!(f, "globals"),
            Self::Models => write!(f, "models"),
            Self::UnitRates => write!(f, "unitRates"),
        }
    }
}

/// Identity of a line within an item set: category, model (for per-model lines) and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineRef {
    /// Category of the line
    pub category: Category,
    /// Model name, only set for [`Category::Models`]
    pub model: Option<String>,
    /// Line name
    pub name: String,
}

impl LineRef {
    /// A global line.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            category: Category::Globals,
            model: None,
            name: name.into(),
        }
    }

    /// A per-model line.
    pub fn model(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: Category::Models,
            model: Some(model.into()),
            name: name.into(),
        }
    }

    /// A unit-rate line.
    pub fn unit_rate(name: impl Into<String>) -> Self {
        Self {
            category: Category::UnitRates,
            model: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "{}/{}/{}", self.category, model, self.name),
            None => write!(f, "{}/{}", self.category, self.name),
        }
    }
}

/// Anything stored in an [`ItemSet`] has a line name.
pub trait Named {
    /// Line name
    fn name(&self) -> &str;
}

/// An RFP line: just the name, prices come from vendors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfpItem {
    /// Line name (e.g., "Footings")
    pub name: String,
}

impl RfpItem {
    /// Creates an unpriced line.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Named for RfpItem {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A priced line from a bid or a work-authorization selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    /// Line name
    pub name: String,
    /// Price quoted by the vendor
    pub price: f64,
}

impl PricedItem {
    /// Creates a priced line.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

impl Named for PricedItem {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Three-category collection of line items. Missing categories read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct ItemSet<T> {
    /// Global lines
    pub globals: Vec<T>,
    /// Per-model lines keyed by model name
    pub models: BTreeMap<String, Vec<T>>,
    /// Unit rates
    pub unit_rates: Vec<T>,
}

impl<T> Default for ItemSet<T> {
    fn default() -> Self {
        Self {
            globals: Vec::new(),
            models: BTreeMap::new(),
            unit_rates: Vec::new(),
        }
    }
}

impl<T: Named> ItemSet<T> {
    /// Appends an item to `category`; `model` selects the group for per-model lines.
    pub fn push(&mut self, category: Category, model: Option<&str>, item: T) {
        match category {
            Category::Globals => self.globals.push(item),
            Category::UnitRates => self.unit_rates.push(item),
            Category::Models => self
                .models
                .entry(model.unwrap_or_default().to_string())
                .or_default()
                .push(item),
        }
    }

    /// Iterates every line with its identity, in category order.
    pub fn lines(&self) -> impl Iterator<Item = (LineRef, &T)> {
        let globals = self
            .globals
            .iter()
            .map(|item| (LineRef::global(item.name()), item));
        let models = self.models.iter().flat_map(|(model, items)| {
            items
                .iter()
                .map(move |item| (LineRef::model(model.as_str(), item.name()), item))
        });
        let unit_rates = self
            .unit_rates
            .iter()
            .map(|item| (LineRef::unit_rate(item.name()), item));
        globals.chain(models).chain(unit_rates)
    }

    /// Looks up the item at `line`.
    #[must_use]
    pub fn get(&self, line: &LineRef) -> Option<&T> {
        let items = match line.category {
            Category::Globals => &self.globals,
            Category::UnitRates => &self.unit_rates,
            Category::Models => self.models.get(line.model.as_deref()?)?,
        };
        items.iter().find(|item| item.name() == line.name)
    }

    /// True when `line` exists in this set.
    #[must_use]
    pub fn contains(&self, line: &LineRef) -> bool {
        self.get(line).is_some()
    }

    /// Number of lines across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.globals.len() + self.models.values().map(Vec::len).sum::<usize>() + self.unit_rates.len()
    }

    /// True when no category holds a line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops per-model groups for models not in `models`.
    pub fn retain_models(&mut self, models: &[String]) {
        self.models.retain(|model, _| models.contains(model));
    }
}

impl ItemSet<PricedItem> {
    /// Sum of all prices in the set.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines().map(|(_, item)| item.price).sum()
    }
}
