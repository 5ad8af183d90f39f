//! Type catalog contract and implementations.
//!
//! A catalog is the read-only index of types that component discovery runs
//! against. It answers three questions: what do we know about a type, which
//! types carry a tag, and which types does a type reference. Absence is a
//! normal answer; catalogs built from partial sources routinely reference
//! types they know nothing about.
//!
//! # Implementations
//!
//! - [`ManifestCatalog`]: in-memory catalog, built in code or loaded from a
//!   YAML/JSON manifest.
//! - [`ScopedCatalog`]: restricts another catalog to package prefixes and
//!   hides types matching exclusion patterns.
//! - [`JavaCatalogBuilder`]: populates a `ManifestCatalog` from Java sources
//!   using tree-sitter (requires the `tree-sitter` feature).

#[cfg(feature = "tree-sitter")]
mod java;
mod manifest;
mod scoped;
mod types;

#[cfg(feature = "tree-sitter")]
pub use java::JavaCatalogBuilder;
pub use manifest::ManifestCatalog;
pub use scoped::ScopedCatalog;
pub use types::{package_of, simple_name, TypeCategory, TypeInfo, Visibility};

use std::collections::BTreeSet;

use crate::error::CatalogError;

/// Read-only lookup contract over a set of types.
///
/// Only [`lookup`](TypeCatalog::lookup) and
/// [`type_names`](TypeCatalog::type_names) are required; the remaining
/// queries are derived from them and may be overridden by catalogs that can
/// answer more cheaply.
pub trait TypeCatalog {
    /// Look up a type by fully-qualified name.
    ///
    /// Returns `Ok(None)` for types the catalog does not know.
    fn lookup(&self, type_name: &str) -> Result<Option<&TypeInfo>, CatalogError>;

    /// All type names in the catalog, sorted.
    fn type_names(&self) -> Vec<&str>;

    /// Names of all types declaring the given tag.
    ///
    /// Types whose metadata cannot be resolved are skipped.
    fn find_by_tag(&self, tag: &str) -> Result<BTreeSet<String>, CatalogError> {
        let mut found = BTreeSet::new();
        for name in self.type_names() {
            match self.lookup(name) {
                Ok(Some(info)) if info.has_tag(tag) => {
                    found.insert(info.name.clone());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping type while searching for tag {}: {}", tag, e),
            }
        }
        Ok(found)
    }

    /// Names of the types directly referenced by `type_name`.
    ///
    /// Unknown types reference nothing.
    fn referenced_types(&self, type_name: &str) -> Result<BTreeSet<String>, CatalogError> {
        Ok(self
            .lookup(type_name)?
            .map(|info| info.references.clone())
            .unwrap_or_default())
    }

    /// Whether `type_name` is a nested (inner) type.
    ///
    /// Unknown types are judged by their binary name (`Outer$Inner`).
    fn is_nested(&self, type_name: &str) -> Result<bool, CatalogError> {
        Ok(match self.lookup(type_name)? {
            Some(info) => info.nested,
            None => type_name.contains('$'),
        })
    }

    /// Whether `type_name` extends or implements `supertype`, directly or
    /// through supertypes known to the catalog.
    fn is_subtype_of(&self, type_name: &str, supertype: &str) -> Result<bool, CatalogError> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![type_name.to_string()];

        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(info) = self.lookup(&current)? else {
                continue;
            };
            for parent in &info.supertypes {
                if parent == supertype {
                    return Ok(true);
                }
                if !visited.contains(parent) {
                    pending.push(parent.clone());
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ManifestCatalog {
        ManifestCatalog::from_types([
            TypeInfo::new("com.shop.Marker").with_category(TypeCategory::Interface),
            TypeInfo::new("com.shop.Base").with_supertype("com.shop.Marker"),
            TypeInfo::new("com.shop.Impl").with_supertype("com.shop.Base"),
            TypeInfo::new("com.shop.Loop").with_supertype("com.shop.Loop"),
            TypeInfo::new("com.shop.Orders")
                .with_tag("Service")
                .with_reference("com.shop.Impl"),
        ])
    }

    #[test]
    fn test_find_by_tag() {
        let catalog = catalog();
        let found = catalog.find_by_tag("Service").unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["com.shop.Orders"]);
        assert!(catalog.find_by_tag("Repository").unwrap().is_empty());
    }

    #[test]
    fn test_referenced_types_of_unknown_type_is_empty() {
        let catalog = catalog();
        assert!(catalog.referenced_types("com.other.Missing").unwrap().is_empty());
        assert!(catalog
            .referenced_types("com.shop.Orders")
            .unwrap()
            .contains("com.shop.Impl"));
    }

    #[test]
    fn test_is_subtype_of_is_transitive() {
        let catalog = catalog();
        assert!(catalog.is_subtype_of("com.shop.Impl", "com.shop.Marker").unwrap());
        assert!(catalog.is_subtype_of("com.shop.Base", "com.shop.Marker").unwrap());
        assert!(!catalog.is_subtype_of("com.shop.Marker", "com.shop.Marker").unwrap());
        assert!(!catalog.is_subtype_of("com.shop.Orders", "com.shop.Marker").unwrap());
    }

    #[test]
    fn test_is_subtype_of_terminates_on_cycles() {
        let catalog = catalog();
        assert!(!catalog.is_subtype_of("com.shop.Loop", "com.shop.Marker").unwrap());
    }

    #[test]
    fn test_is_nested_falls_back_to_binary_name() {
        let catalog = catalog();
        assert!(catalog.is_nested("com.other.Outer$Inner").unwrap());
        assert!(!catalog.is_nested("com.shop.Orders").unwrap());
    }
}
