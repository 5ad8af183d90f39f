//! Efferent dependency graph construction.
//!
//! For every code element of every component we walk the catalog's
//! reference graph depth-first. Reaching a type owned by another component
//! records an edge and stops; reaching a plain type keeps walking through
//! it. Each walk has its own visited set, so reference cycles between
//! plumbing types terminate.

use std::collections::{BTreeSet, HashSet};

use crate::catalog::TypeCatalog;
use crate::error::DiscoveryError;
use crate::model::{ComponentId, ComponentRegistry};

/// Builds component-to-component "uses" edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraphBuilder {
    description: String,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Description attached to newly recorded edges (empty by default).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add edges for every component in the registry.
    ///
    /// Returns the number of edges added. Running it again over the same
    /// registry and catalog adds nothing.
    pub fn build(
        &self,
        registry: &mut ComponentRegistry,
        catalog: &dyn TypeCatalog,
    ) -> Result<usize, DiscoveryError> {
        let mut added = 0;
        for source in registry.ids() {
            let destinations = self.efferent_dependencies(registry, catalog, source)?;
            for destination in destinations {
                if registry.add_dependency(source, destination, &self.description) {
                    added += 1;
                }
            }
        }
        tracing::debug!("added {} component dependencies", added);
        Ok(added)
    }

    /// Components reachable from `source` through non-component types.
    pub fn efferent_dependencies(
        &self,
        registry: &ComponentRegistry,
        catalog: &dyn TypeCatalog,
        source: ComponentId,
    ) -> Result<BTreeSet<ComponentId>, DiscoveryError> {
        let mut destinations = BTreeSet::new();
        for element in registry.component(source).code() {
            walk(registry, catalog, source, &element.type_name, &mut destinations)?;
        }
        Ok(destinations)
    }
}

/// Depth-first walk from one code element with a fresh visited set.
fn walk(
    registry: &ComponentRegistry,
    catalog: &dyn TypeCatalog,
    source: ComponentId,
    start: &str,
    destinations: &mut BTreeSet<ComponentId>,
) -> Result<(), DiscoveryError> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut pending = vec![start.to_string()];

    while let Some(type_name) = pending.pop() {
        if !visited.insert(type_name.clone()) {
            continue;
        }

        let references = match catalog.referenced_types(&type_name) {
            Ok(references) => references,
            Err(e) => {
                tracing::warn!("ignoring references of {}: {}", type_name, e);
                continue;
            }
        };

        for referenced in references {
            let nested = catalog.is_nested(&referenced).unwrap_or_else(|e| {
                tracing::warn!("no metadata for {}: {}", referenced, e);
                referenced.contains('$')
            });
            if nested {
                continue;
            }

            match registry.find_component(&referenced)? {
                Some(destination) => {
                    if destination != source {
                        destinations.insert(destination);
                    }
                }
                None => {
                    if !visited.contains(&referenced) {
                        pending.push(referenced);
                    }
                }
            }
        }
    }

    Ok(())
}
