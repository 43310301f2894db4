use std::fmt;

use serde::{Deserialize, Serialize};

pub const PLUGIN_IDENTIFIER: &str = "myminifactory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub token: String,
}

impl PrinterIdentity {
    pub fn new(manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            serial_number: String::new(),
            token: String::new(),
        }
    }

    /// Drops the credentials handed out by a registration.
    pub fn clear_registration(&mut self) {
        self.serial_number.clear();
        self.token.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportedPrinter {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
}

impl SupportedPrinter {
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for SupportedPrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.model)
    }
}

/// Catalog records without a model cannot be registered and are dropped.
pub fn normalize_catalog(printers: &[SupportedPrinter]) -> Vec<SupportedPrinter> {
    printers
        .iter()
        .filter(|printer| !printer.model.trim().is_empty())
        .cloned()
        .collect()
}

pub fn distinct_brands(catalog: &[SupportedPrinter]) -> Vec<String> {
    let mut brands: Vec<String> = Vec::new();
    for printer in catalog {
        if !brands.iter().any(|brand| *brand == printer.brand) {
            brands.push(printer.brand.clone());
        }
    }
    brands.sort();
    brands
}

pub fn printers_for_brand<'a>(
    catalog: &'a [SupportedPrinter],
    manufacturer: &str,
) -> Vec<&'a SupportedPrinter> {
    if manufacturer.is_empty() {
        return catalog.iter().collect();
    }
    catalog
        .iter()
        .filter(|printer| printer.brand == manufacturer)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<SupportedPrinter> {
        vec![
            SupportedPrinter::new("Prusa", "mk3s"),
            SupportedPrinter::new("Anet", "anet-a8"),
            SupportedPrinter::new("Prusa", "mini"),
            SupportedPrinter::new("Creality", "ender-3"),
        ]
    }

    #[test]
    fn brands_are_distinct_and_sorted() {
        assert_eq!(distinct_brands(&catalog()), vec!["Anet", "Creality", "Prusa"]);
    }

    #[test]
    fn brand_filter_keeps_catalog_order() {
        let catalog = catalog();
        let models: Vec<&str> = printers_for_brand(&catalog, "Prusa")
            .into_iter()
            .map(|printer| printer.model.as_str())
            .collect();
        assert_eq!(models, vec!["mk3s", "mini"]);
    }

    #[test]
    fn empty_manufacturer_returns_whole_catalog() {
        let catalog = catalog();
        assert_eq!(printers_for_brand(&catalog, "").len(), 4);
        assert!(printers_for_brand(&catalog, "Unknown").is_empty());
    }

    #[test]
    fn normalize_drops_records_without_model() {
        let raw = vec![
            SupportedPrinter::new("Anet", "anet-a8"),
            SupportedPrinter::new("Generic", " "),
            SupportedPrinter::new("Generic", ""),
        ];
        assert_eq!(normalize_catalog(&raw), vec![SupportedPrinter::new("Anet", "anet-a8")]);
    }

    #[test]
    fn catalog_record_tolerates_missing_fields() {
        let record: SupportedPrinter =
            serde_json::from_str(r#"{"brand":"Anet","id":12}"#).expect("decode record");
        assert_eq!(record.brand, "Anet");
        assert!(record.model.is_empty());
    }
}
