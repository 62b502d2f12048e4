//! Product catalogue behind the "Find Products" crop action.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cropwise_frontend::models::null_as_default;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub price: Option<f64>,
    /// Crops the product is meant for.
    #[serde(deserialize_with = "null_as_default")]
    pub crops: Vec<String>,
}

impl Product {
    /// Listed for `crop` by name in `crops`, or by mention in the name or
    /// category. Case-insensitive.
    pub fn suits(&self, crop: &str) -> bool {
        let wanted = crop.trim().to_lowercase();
        if wanted.is_empty() {
            return true;
        }
        self.crops
            .iter()
            .any(|listed| listed.trim().to_lowercase() == wanted)
            || self.name.to_lowercase().contains(&wanted)
            || self.category.to_lowercase().contains(&wanted)
    }
}

/// Products for `crop`, or the whole catalogue when no crop is given.
pub fn products_for<'a>(catalogue: &'a [Product], crop: Option<&str>) -> Vec<&'a Product> {
    match crop.map(str::trim).filter(|crop| !crop.is_empty()) {
        Some(crop) => catalogue.iter().filter(|p| p.suits(crop)).collect(),
        None => catalogue.iter().collect(),
    }
}

/// Read the catalogue. A missing file is an empty catalogue, a malformed one
/// is an error.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    if !path.exists() {
        warn!("product catalogue missing at {}; marketplace is empty", path.display());
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {path:?}"))?;
    let products = parse_products(&raw).with_context(|| format!("failed parsing {path:?}"))?;
    info!("loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

fn parse_products(raw: &str) -> Result<Vec<Product>> {
    serde_json::from_str::<Vec<Product>>(raw).context("catalogue is not a list of products")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUE: &str = r#"[
        {"name": "Hybrid Maize Seed", "category": "Seeds", "price": 24.5, "crops": ["Maize"]},
        {"name": "NPK 20-10-10", "category": "Fertilizer", "price": null,
         "crops": ["maize", "Rice"]},
        {"name": "Drip Kit", "category": "Irrigation", "description": null, "crops": null}
    ]"#;

    #[test]
    fn parses_catalogue_with_nulls() {
        let products = parse_products(CATALOGUE).unwrap();
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].price, Some(24.5));
        assert_eq!(products[1].price, None);
        assert!(products[2].crops.is_empty());
        assert!(products[2].description.is_empty());
    }

    #[test]
    fn filters_by_crop_case_insensitively() {
        let products = parse_products(CATALOGUE).unwrap();

        let maize = products_for(&products, Some("MAIZE"));
        let names = maize.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Hybrid Maize Seed", "NPK 20-10-10"]);

        assert!(products_for(&products, Some("Cotton")).is_empty());
        assert_eq!(products_for(&products, Some("  ")).len(), 3);
        assert_eq!(products_for(&products, None).len(), 3);
    }

    #[test]
    fn missing_catalogue_is_empty_and_malformed_is_an_error() {
        let products = load_products(Path::new("/nonexistent/cropwise/products.json")).unwrap();
        assert!(products.is_empty());
        assert!(parse_products("{\"name\": 1}").is_err());
    }
}
