//! SwiftPM manifest dumps.
//!
//! Phase 1 of the pipeline runs `swift package dump-package` and parses its
//! JSON stdout into [`Manifest`]. Only the fields the pipeline consumes are
//! modeled; everything else in the dump is ignored.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::errors::BuildError;

/// Minimum macOS version used when the manifest declares none.
pub const DEFAULT_MACOS_VERSION: &str = "10.10";

/// Parsed package manifest, as reported by `swift package dump-package`.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Package identifier.
    pub name: String,

    /// Declared products, in manifest order.
    #[serde(default)]
    pub products: Vec<Product>,

    /// Declared platform constraints, in manifest order.
    #[serde(default)]
    pub platforms: Vec<PlatformRequirement>,
}

/// A product declared by the package.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub name: String,
}

/// A minimum-version constraint for one platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRequirement {
    pub platform_name: String,
    pub version: String,
}

impl Manifest {
    /// Parse a manifest dump from captured stdout.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse `swift package dump-package` output")
    }

    /// Resolve the product to build.
    ///
    /// A configured product is used as-is. Otherwise the manifest must
    /// declare exactly one product; zero or several are errors, since
    /// automatic selection is never attempted when ambiguous.
    pub fn resolve_product(&self, configured: Option<&str>) -> Result<String, BuildError> {
        if let Some(name) = configured {
            return Ok(name.to_string());
        }

        match self.products.as_slice() {
            [] => Err(BuildError::NoProducts {
                package: self.name.clone(),
            }),
            [only] => Ok(only.name.clone()),
            many => Err(BuildError::AmbiguousProduct {
                package: self.name.clone(),
                products: many
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Declared minimum macOS version, or the default.
    pub fn macos_version(&self) -> String {
        self.platforms
            .iter()
            .find(|p| p.platform_name == "macos")
            .map(|p| p.version.clone())
            .unwrap_or_else(|| DEFAULT_MACOS_VERSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> Manifest {
        Manifest::parse(json).unwrap()
    }

    #[test]
    fn test_parse_dump() {
        let m = manifest(
            r#"{
                "name": "MyAddon",
                "products": [{"name": "MyAddon", "type": {"library": ["automatic"]}}],
                "platforms": [{"platformName": "macos", "version": "12.0"}],
                "toolsVersion": {"_version": "5.9.0"}
            }"#,
        );

        assert_eq!(m.name, "MyAddon");
        assert_eq!(m.products.len(), 1);
        assert_eq!(m.platforms[0].platform_name, "macos");
    }

    #[test]
    fn test_configured_product_wins() {
        let m = manifest(r#"{"name": "P", "products": [{"name": "A"}, {"name": "B"}]}"#);
        assert_eq!(m.resolve_product(Some("B")).unwrap(), "B");
    }

    #[test]
    fn test_single_product_selected() {
        let m = manifest(r#"{"name": "P", "products": [{"name": "Only"}]}"#);
        assert_eq!(m.resolve_product(None).unwrap(), "Only");
    }

    #[test]
    fn test_no_products_fails() {
        let m = manifest(r#"{"name": "Empty"}"#);
        let err = m.resolve_product(None).unwrap_err();
        assert!(err.to_string().contains("no products"));
        assert!(err.to_string().contains("Empty"));
    }

    #[test]
    fn test_multiple_products_ambiguous() {
        let m = manifest(r#"{"name": "P", "products": [{"name": "A"}, {"name": "B"}]}"#);
        let err = m.resolve_product(None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("multiple products"));
        assert!(msg.contains("A, B"));
        assert!(msg.contains("set `product`"));
    }

    #[test]
    fn test_macos_version_lookup() {
        let m = manifest(
            r#"{
                "name": "P",
                "platforms": [
                    {"platformName": "ios", "version": "15.0"},
                    {"platformName": "macos", "version": "11.0"}
                ]
            }"#,
        );
        assert_eq!(m.macos_version(), "11.0");
    }

    #[test]
    fn test_macos_version_default() {
        let m = manifest(r#"{"name": "P"}"#);
        assert_eq!(m.macos_version(), "10.10");
    }
}
