//! Strategies that find the types behind a component.
//!
//! Supporting types belong to a component conceptually (implementations,
//! helpers in the same package) without becoming components themselves.
//! Strategies only propose; the engine drops nested types and types some
//! component already claims.

use std::collections::BTreeSet;

use crate::catalog::{package_of, TypeCatalog};
use crate::error::CatalogError;
use crate::model::Component;

/// Finds supporting types for an already registered component.
pub trait SupportingTypeStrategy {
    fn label(&self) -> String;

    fn find_supporting_types(
        &self,
        component: &Component,
        catalog: &dyn TypeCatalog,
    ) -> Result<BTreeSet<String>, CatalogError>;
}

/// Package of a component's primary type, preferring catalog facts.
fn primary_package(component: &Component, catalog: &dyn TypeCatalog) -> Option<String> {
    let primary = component.primary_type()?;
    match catalog.lookup(primary) {
        Ok(Some(info)) => Some(info.package().to_string()),
        _ => Some(package_of(primary).to_string()),
    }
}

/// Types referenced by the component's primary type.
#[derive(Debug, Clone, Default)]
pub struct ReferencedTypes {
    same_package_only: bool,
}

impl ReferencedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep referenced types from the primary type's package.
    pub fn same_package_only(mut self, same_package_only: bool) -> Self {
        self.same_package_only = same_package_only;
        self
    }
}

impl SupportingTypeStrategy for ReferencedTypes {
    fn label(&self) -> String {
        if self.same_package_only {
            "referenced types in same package".to_string()
        } else {
            "referenced types".to_string()
        }
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        catalog: &dyn TypeCatalog,
    ) -> Result<BTreeSet<String>, CatalogError> {
        let Some(primary) = component.primary_type() else {
            return Ok(BTreeSet::new());
        };
        let package = primary_package(component, catalog);

        let mut found = BTreeSet::new();
        for referenced in catalog.referenced_types(primary)? {
            if referenced == primary {
                continue;
            }
            let Some(info) = catalog.lookup(&referenced)? else {
                continue;
            };
            if self.same_package_only && Some(info.package()) != package.as_deref() {
                continue;
            }
            found.insert(referenced);
        }
        Ok(found)
    }
}

/// Every type in the primary type's package.
#[derive(Debug, Clone, Default)]
pub struct ComponentPackage;

impl SupportingTypeStrategy for ComponentPackage {
    fn label(&self) -> String {
        "component package".to_string()
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        catalog: &dyn TypeCatalog,
    ) -> Result<BTreeSet<String>, CatalogError> {
        let (Some(primary), Some(package)) =
            (component.primary_type(), primary_package(component, catalog))
        else {
            return Ok(BTreeSet::new());
        };

        let mut found = BTreeSet::new();
        for name in catalog.type_names() {
            if name == primary {
                continue;
            }
            if let Some(info) = catalog.lookup(name)? {
                if info.package() == package {
                    found.insert(info.name.clone());
                }
            }
        }
        Ok(found)
    }
}

/// For interface components, the first concrete type implementing it.
#[derive(Debug, Clone, Default)]
pub struct FirstImplementation;

impl SupportingTypeStrategy for FirstImplementation {
    fn label(&self) -> String {
        "first implementation of interface".to_string()
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        catalog: &dyn TypeCatalog,
    ) -> Result<BTreeSet<String>, CatalogError> {
        let mut found = BTreeSet::new();
        let Some(primary) = component.primary_type() else {
            return Ok(found);
        };
        match catalog.lookup(primary)? {
            Some(info) if info.category.is_interface_like() => {}
            _ => return Ok(found),
        }

        for name in catalog.type_names() {
            let Some(info) = catalog.lookup(name)? else {
                continue;
            };
            if info.nested || info.category.is_interface_like() {
                continue;
            }
            if info.supertypes.iter().any(|s| s == primary) {
                found.insert(info.name.clone());
                break;
            }
        }
        Ok(found)
    }
}
