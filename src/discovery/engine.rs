//! Discovery orchestration.
//!
//! A run has three phases, each finished before the next begins:
//!
//! 1. find components with every match strategy and register them through
//!    the duplicate policy;
//! 2. classify code elements and attach supporting types;
//! 3. build the dependency graph.
//!
//! Any [`DiscoveryError`] restores the registry to its state before the run.

use std::collections::HashSet;

use super::{
    Candidate, ComponentMatchStrategy, DependencyGraphBuilder, DuplicatePolicy,
    SupportingTypeStrategy,
};
use crate::catalog::TypeCatalog;
use crate::classify;
use crate::error::DiscoveryError;
use crate::model::{ComponentId, ComponentRegistry};

/// Runs component discovery against a catalog.
#[derive(Default)]
pub struct ComponentDiscovery {
    strategies: Vec<Box<dyn ComponentMatchStrategy>>,
    supporting: Vec<Box<dyn SupportingTypeStrategy>>,
    duplicate_policy: DuplicatePolicy,
    graph: DependencyGraphBuilder,
}

impl ComponentDiscovery {
    /// An engine with no strategies and the fail-fast duplicate policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy<S: ComponentMatchStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn with_supporting<S: SupportingTypeStrategy + 'static>(mut self, strategy: S) -> Self {
        self.supporting.push(Box::new(strategy));
        self
    }

    pub fn add_strategy(&mut self, strategy: Box<dyn ComponentMatchStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn add_supporting(&mut self, strategy: Box<dyn SupportingTypeStrategy>) {
        self.supporting.push(strategy);
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn graph_builder(mut self, graph: DependencyGraphBuilder) -> Self {
        self.graph = graph;
        self
    }

    /// Run all phases and return the components found by this run, in
    /// registration order.
    pub fn run(
        &self,
        registry: &mut ComponentRegistry,
        catalog: &dyn TypeCatalog,
    ) -> Result<Vec<ComponentId>, DiscoveryError> {
        if self.strategies.is_empty() {
            return Err(DiscoveryError::Configuration(
                "at least one component match strategy is required".to_string(),
            ));
        }

        let snapshot = registry.clone();
        match self.run_phases(registry, catalog) {
            Ok(found) => Ok(found),
            Err(e) => {
                *registry = snapshot;
                Err(e)
            }
        }
    }

    fn run_phases(
        &self,
        registry: &mut ComponentRegistry,
        catalog: &dyn TypeCatalog,
    ) -> Result<Vec<ComponentId>, DiscoveryError> {
        let found = self.find_components(registry, catalog)?;
        tracing::debug!("discovered {} components", found.len());

        classify_code(registry, catalog, &found);
        self.find_supporting_types(registry, catalog, &found)?;

        self.graph.build(registry, catalog)?;
        Ok(found)
    }

    /// Phase 1: register the union of all strategies' candidates.
    fn find_components(
        &self,
        registry: &mut ComponentRegistry,
        catalog: &dyn TypeCatalog,
    ) -> Result<Vec<ComponentId>, DiscoveryError> {
        let mut seen: HashSet<Candidate> = HashSet::new();
        let mut found: Vec<ComponentId> = Vec::new();

        for strategy in &self.strategies {
            let mut candidates = match strategy.find_candidates(catalog) {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("{} found nothing: {}", strategy.label(), e);
                    continue;
                }
            };
            candidates.sort_by(|a, b| (&a.type_name, &a.name).cmp(&(&b.type_name, &b.name)));
            tracing::debug!("{} proposed {} components", strategy.label(), candidates.len());

            for candidate in candidates {
                if !seen.insert(candidate.clone()) {
                    continue;
                }
                let id = self.duplicate_policy.register(registry, &candidate)?;
                if !found.contains(&id) {
                    tracing::debug!("component {} -> {}", candidate.name, candidate.type_name);
                    found.push(id);
                }
            }
        }

        Ok(found)
    }

    /// Phase 2b: attach unclaimed, non-nested supporting types.
    fn find_supporting_types(
        &self,
        registry: &mut ComponentRegistry,
        catalog: &dyn TypeCatalog,
        found: &[ComponentId],
    ) -> Result<(), DiscoveryError> {
        for strategy in &self.supporting {
            for &id in found {
                let proposed = match strategy.find_supporting_types(registry.component(id), catalog)
                {
                    Ok(proposed) => proposed,
                    Err(e) => {
                        tracing::warn!(
                            "{} failed for {}: {}",
                            strategy.label(),
                            registry.component(id).name(),
                            e
                        );
                        continue;
                    }
                };

                for type_name in proposed {
                    let nested = catalog.is_nested(&type_name).unwrap_or_else(|e| {
                        tracing::warn!("no metadata for supporting type {}: {}", type_name, e);
                        type_name.contains('$')
                    });
                    if nested {
                        continue;
                    }
                    if registry.find_component(&type_name)?.is_some() {
                        continue;
                    }

                    let (visibility, category) = classify::classify(catalog, &type_name);
                    if let Some(element) = registry.add_supporting_type(id, &type_name) {
                        element.classify(visibility, category);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Phase 2a: set visibility and category on existing code elements.
fn classify_code(registry: &mut ComponentRegistry, catalog: &dyn TypeCatalog, found: &[ComponentId]) {
    for &id in found {
        for element in registry.component_mut(id).code_mut() {
            let (visibility, category) = classify::classify(catalog, &element.type_name);
            element.classify(visibility, category);
        }
    }
}

/// Discover components for one container.
///
/// Convenience wrapper around [`ComponentDiscovery`].
pub fn discover_components(
    registry: &mut ComponentRegistry,
    catalog: &dyn TypeCatalog,
    strategies: Vec<Box<dyn ComponentMatchStrategy>>,
    supporting: Vec<Box<dyn SupportingTypeStrategy>>,
    duplicate_policy: DuplicatePolicy,
) -> Result<Vec<ComponentId>, DiscoveryError> {
    let mut discovery = ComponentDiscovery::new().duplicate_policy(duplicate_policy);
    for strategy in strategies {
        discovery.add_strategy(strategy);
    }
    for strategy in supporting {
        discovery.add_supporting(strategy);
    }
    discovery.run(registry, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManifestCatalog, TypeCategory, TypeInfo, Visibility};
    use crate::discovery::{AnnotationMatch, ReferencedTypes};
    use crate::error::CatalogError;

    /// Catalog that fails for one type name.
    struct FlakyCatalog {
        inner: ManifestCatalog,
        broken: &'static str,
    }

    impl TypeCatalog for FlakyCatalog {
        fn lookup(&self, type_name: &str) -> Result<Option<&TypeInfo>, CatalogError> {
            if type_name == self.broken {
                return Err(CatalogError::unresolved(type_name, "class file missing"));
            }
            self.inner.lookup(type_name)
        }

        fn type_names(&self) -> Vec<&str> {
            self.inner.type_names()
        }
    }

    fn shop() -> ManifestCatalog {
        ManifestCatalog::from_types([
            TypeInfo::new("com.shop.OrderController")
                .with_tag("Controller")
                .with_reference("com.shop.OrderService")
                .with_reference("com.shop.OrderForm"),
            TypeInfo::new("com.shop.OrderForm").with_visibility(Visibility::Package),
            TypeInfo::new("com.shop.OrderService")
                .with_tag("Service")
                .with_category(TypeCategory::Interface)
                .with_reference("com.shop.Broken")
                .with_reference("com.shop.OrderRepository"),
            TypeInfo::new("com.shop.OrderRepository").with_tag("Repository"),
            TypeInfo::new("com.shop.Broken").with_reference("com.shop.OrderController"),
        ])
    }

    fn engine() -> ComponentDiscovery {
        ComponentDiscovery::new()
            .with_strategy(AnnotationMatch::new("Controller", "Spring MVC Controller"))
            .with_strategy(AnnotationMatch::new("Service", "Spring Service"))
            .with_strategy(AnnotationMatch::new("Repository", "Spring Repository"))
    }

    #[test]
    fn test_requires_a_strategy() {
        let mut registry = ComponentRegistry::new("Web");
        let err = ComponentDiscovery::new()
            .run(&mut registry, &shop())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_classifies_primary_and_supporting_types() {
        let catalog = shop();
        let mut registry = ComponentRegistry::new("Web");
        engine()
            .with_supporting(ReferencedTypes::new())
            .run(&mut registry, &catalog)
            .unwrap();

        let service = registry.component_with_name("OrderService").unwrap();
        assert_eq!(service.category(), Some(TypeCategory::Interface));
        assert_eq!(service.visibility(), Some(Visibility::Public));

        let controller = registry.component_with_name("OrderController").unwrap();
        let form = controller.supporting_types().next().unwrap();
        assert_eq!(form.type_name, "com.shop.OrderForm");
        assert_eq!(form.visibility, Some(Visibility::Package));
    }

    #[test]
    fn test_catalog_failures_do_not_abort_the_run() {
        let catalog = FlakyCatalog {
            inner: shop(),
            broken: "com.shop.Broken",
        };
        let mut registry = ComponentRegistry::new("Web");
        let found = engine().run(&mut registry, &catalog).unwrap();
        assert_eq!(found.len(), 3);

        let service = registry.component_with_name("OrderService").unwrap();
        let repository = registry.component_with_name("OrderRepository").unwrap();
        let controller = registry.component_with_name("OrderController").unwrap();
        assert!(service.uses(repository.id()));
        // Only reachable through the broken type.
        assert!(!service.uses(controller.id()));
    }

    #[test]
    fn test_unreadable_component_keeps_incoming_edges() {
        let catalog = FlakyCatalog {
            inner: shop(),
            broken: "com.shop.OrderRepository",
        };
        let mut registry = ComponentRegistry::new("Web");
        let store = registry
            .add_component("OrderStore", Some("com.shop.OrderRepository"), "", "")
            .unwrap();

        engine().run(&mut registry, &catalog).unwrap();

        let service = registry.component_with_name("OrderService").unwrap();
        assert!(service.uses(store));
        assert!(registry.component_with_name("OrderRepository").is_none());
    }

    #[test]
    fn test_failed_run_restores_registry() {
        let catalog = ManifestCatalog::from_types([
            TypeInfo::new("a.X").with_tag("Service"),
            TypeInfo::new("b.X").with_tag("Repository"),
        ]);
        let mut registry = ComponentRegistry::new("Web");
        registry.add_component("Gateway", None, "manual", "").unwrap();

        let err = engine().run(&mut registry, &catalog).unwrap_err();

        assert!(matches!(err, DiscoveryError::DuplicateComponent { .. }));
        assert_eq!(registry.len(), 1);
        assert!(registry.component_with_name("Gateway").is_some());
    }

    #[test]
    fn test_identical_candidates_are_not_duplicates() {
        let catalog = ManifestCatalog::from_types([TypeInfo::new("a.X").with_tag("Service")]);
        let mut registry = ComponentRegistry::new("Web");
        let found = ComponentDiscovery::new()
            .with_strategy(AnnotationMatch::new("Service", "Spring"))
            .with_strategy(AnnotationMatch::new("Service", "Spring"))
            .run(&mut registry, &catalog)
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_name_type_disagreement_is_a_configuration_error() {
        let catalog = ManifestCatalog::from_types([
            TypeInfo::new("a.Orders").with_tag("Service").with_reference("legacy.Gateway"),
        ]);
        let mut registry = ComponentRegistry::new("Web");
        registry
            .add_component("legacy.Gateway", Some("other.Gateway"), "", "")
            .unwrap();

        let err = ComponentDiscovery::new()
            .with_strategy(AnnotationMatch::new("Service", "Spring"))
            .run(&mut registry, &catalog)
            .unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(registry.len(), 1);
    }
}
