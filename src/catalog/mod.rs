//! Price catalog
//!
//! Static label to unit price table. Lookups are total: anything the
//! catalog doesn't list costs 0 rather than failing.

use std::collections::HashMap;

use crate::config::CatalogSettings;

/// Immutable label -> price mapping
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    prices: HashMap<String, u64>,
    currency: String,
}

impl PriceCatalog {
    /// Build a catalog from explicit entries
    pub fn new<I, S>(entries: I, currency: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            prices: entries.into_iter().map(|(label, price)| (label.into(), price)).collect(),
            currency: currency.into(),
        }
    }

    /// Build the catalog from the `[catalog]` config section
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self::new(
            settings.prices.iter().map(|(label, price)| (label.as_str(), *price)),
            settings.currency.clone(),
        )
    }

    /// Price for `label`, 0 when unlisted. Labels match exactly.
    pub fn price_of(&self, label: &str) -> u64 {
        self.prices.get(label).copied().unwrap_or(0)
    }

    /// Currency prefix used when formatting prices
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Format `price` with comma thousand separators, e.g. `6000` -> `"6,000"`
pub fn group_thousands(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
