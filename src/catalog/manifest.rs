//! In-memory catalog, optionally loaded from a YAML or JSON manifest.
//!
//! Manifest format:
//!
//! ```yaml
//! types:
//!   - name: com.shop.OrderService
//!     tags: [Service]
//!     references: [com.shop.OrderRepository]
//!   - name: com.shop.OrderRepository
//!     category: interface
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{TypeCatalog, TypeInfo};
use crate::error::CatalogError;

/// On-disk manifest layout.
#[derive(Debug, Default, Deserialize, Serialize)]
struct Manifest {
    #[serde(default)]
    types: Vec<TypeInfo>,
}

/// Catalog backed by a sorted map of type facts.
#[derive(Debug, Clone, Default)]
pub struct ManifestCatalog {
    types: BTreeMap<String, TypeInfo>,
}

impl ManifestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from type facts. Later duplicates replace earlier ones.
    pub fn from_types<I: IntoIterator<Item = TypeInfo>>(types: I) -> Self {
        let mut catalog = Self::new();
        for info in types {
            catalog.insert(info);
        }
        catalog
    }

    /// Parse a YAML manifest.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let manifest: Manifest =
            serde_yaml::from_str(content).map_err(|e| CatalogError::Manifest(e.to_string()))?;
        Ok(Self::from_types(manifest.types))
    }

    /// Parse a JSON manifest.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let manifest: Manifest =
            serde_json::from_str(content).map_err(|e| CatalogError::Manifest(e.to_string()))?;
        Ok(Self::from_types(manifest.types))
    }

    /// Load a manifest file, choosing the format by extension (`.json` or YAML).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let catalog = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        tracing::debug!("loaded {} types from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Serialize the catalog back into manifest form.
    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        let manifest = Manifest {
            types: self.types.values().cloned().collect(),
        };
        Ok(serde_yaml::to_string(&manifest)?)
    }

    /// Add or replace a type, returning the previous facts for that name.
    pub fn insert(&mut self, info: TypeInfo) -> Option<TypeInfo> {
        self.types.insert(info.name.clone(), info)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }
}

impl TypeCatalog for ManifestCatalog {
    fn lookup(&self, type_name: &str) -> Result<Option<&TypeInfo>, CatalogError> {
        Ok(self.types.get(type_name))
    }

    fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{TypeCategory, Visibility};

    #[test]
    fn test_parse_yaml_manifest() {
        let yaml = r#"
types:
  - name: com.shop.OrderService
    tags: [Service]
    references: [com.shop.OrderRepository, com.shop.Utils]
  - name: com.shop.OrderRepository
    category: interface
  - name: com.shop.Utils
    visibility: package
  - name: com.shop.OrderService.Line
    package: com.shop
    nested: true
"#;
        let catalog = ManifestCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 4);

        let repo = catalog.lookup("com.shop.OrderRepository").unwrap().unwrap();
        assert_eq!(repo.category, TypeCategory::Interface);

        let utils = catalog.lookup("com.shop.Utils").unwrap().unwrap();
        assert_eq!(utils.visibility, Visibility::Package);

        let line = catalog.lookup("com.shop.OrderService.Line").unwrap().unwrap();
        assert!(line.nested);
        assert_eq!(line.package(), "com.shop");

        assert_eq!(
            catalog.referenced_types("com.shop.OrderService").unwrap().len(),
            2
        );
    }

    #[test]
    fn test_parse_json_manifest() {
        let json = r#"{"types": [{"name": "a.B", "tags": ["Controller"]}]}"#;
        let catalog = ManifestCatalog::from_json_str(json).unwrap();
        assert!(catalog.contains("a.B"));
        assert!(catalog.find_by_tag("Controller").unwrap().contains("a.B"));
    }

    #[test]
    fn test_invalid_manifest_is_reported() {
        let err = ManifestCatalog::from_yaml_str("types: [ { category: class } ]").unwrap_err();
        assert!(matches!(err, CatalogError::Manifest(_)));
    }

    #[test]
    fn test_yaml_round_trip_keeps_types() {
        let catalog = ManifestCatalog::from_types([
            TypeInfo::new("a.B").with_tag("Service"),
            TypeInfo::new("a.C"),
        ]);
        let yaml = catalog.to_yaml_string().unwrap();
        let reloaded = ManifestCatalog::from_yaml_str(&yaml).unwrap();
        assert_eq!(reloaded.type_names(), vec!["a.B", "a.C"]);
    }

    #[test]
    fn test_load_by_extension() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("types.json");
        std::fs::write(&path, r#"{"types": [{"name": "a.B"}]}"#).unwrap();

        let catalog = ManifestCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
