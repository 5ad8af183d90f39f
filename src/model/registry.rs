//! The container-scoped set of components.

use std::collections::HashMap;

use super::{CodeElement, CodeElementRole, Component, ComponentId, Dependency};
use crate::error::DiscoveryError;

/// Holds the components of one architectural boundary (a container).
///
/// Component names are unique. A type name is indexed to the first
/// component that claimed it as a code element; supporting types are never
/// attached to a second component.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    name: String,
    description: String,
    technology: String,
    components: Vec<Component>,
    by_name: HashMap<String, ComponentId>,
    by_type: HashMap<String, ComponentId>,
}

impl ComponentRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Add a new component.
    ///
    /// Fails with [`DiscoveryError::DuplicateComponent`] if the name is taken;
    /// discovery routes collisions through a
    /// [`DuplicatePolicy`](crate::discovery::DuplicatePolicy) before getting here.
    pub fn add_component(
        &mut self,
        name: &str,
        type_name: Option<&str>,
        description: &str,
        technology: &str,
    ) -> Result<ComponentId, DiscoveryError> {
        if name.trim().is_empty() {
            return Err(DiscoveryError::Configuration(
                "component name must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.component_with_name(name) {
            return Err(DiscoveryError::DuplicateComponent {
                name: name.to_string(),
                existing_type: existing.primary_type().map(str::to_string),
                proposed_type: type_name.map(str::to_string),
            });
        }

        let id = ComponentId(self.components.len());
        let component = Component::new(id, name, type_name, description, technology);
        if let Some(primary) = component.primary_type() {
            self.by_type.entry(primary.to_string()).or_insert(id);
        }
        self.by_name.insert(name.to_string(), id);
        self.components.push(component);
        Ok(id)
    }

    /// Attach a supporting type to a component.
    ///
    /// Returns `None` without changes if any component already claims the type.
    pub fn add_supporting_type(
        &mut self,
        id: ComponentId,
        type_name: &str,
    ) -> Option<&mut CodeElement> {
        if self.by_type.contains_key(type_name) {
            return None;
        }
        self.by_type.insert(type_name.to_string(), id);

        let code = self.components[id.0].code_mut();
        code.push(CodeElement::new(type_name, CodeElementRole::Supporting));
        code.last_mut()
    }

    /// Replace description, technology and primary type of a component.
    pub(crate) fn overwrite(
        &mut self,
        id: ComponentId,
        type_name: Option<&str>,
        description: &str,
        technology: &str,
    ) {
        let type_name = type_name.filter(|t| !t.is_empty());
        let component = &mut self.components[id.0];
        component.description = description.to_string();
        component.technology = technology.to_string();

        let old = component
            .code
            .iter()
            .position(|c| c.role == CodeElementRole::Primary)
            .map(|pos| component.code.remove(pos));
        if let Some(old) = old {
            if self.by_type.get(&old.type_name) == Some(&id) {
                self.by_type.remove(&old.type_name);
                // Another name may still be backed by the old type.
                let heir = self
                    .components
                    .iter()
                    .find(|c| c.has_type(&old.type_name))
                    .map(Component::id);
                if let Some(heir) = heir {
                    self.by_type.insert(old.type_name, heir);
                }
            }
        }

        if let Some(new_type) = type_name {
            let component = &mut self.components[id.0];
            // The new type may already be one of our supporting types.
            component.code.retain(|c| c.type_name != new_type);
            component
                .code
                .insert(0, CodeElement::new(new_type, CodeElementRole::Primary));
            self.by_type.entry(new_type.to_string()).or_insert(id);
        }
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id.0]
    }

    /// All components in registration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn ids(&self) -> Vec<ComponentId> {
        self.components.iter().map(Component::id).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component_with_name(&self, name: &str) -> Option<&Component> {
        self.by_name.get(name).map(|id| self.component(*id))
    }

    /// The component that claims `type_name` as a code element.
    pub fn component_of_type(&self, type_name: &str) -> Option<&Component> {
        self.by_type.get(type_name).map(|id| self.component(*id))
    }

    /// Resolve the component owning a type: by type identity first, then by
    /// component name.
    ///
    /// A name match whose component is backed by a different type is
    /// ambiguous and reported as [`DiscoveryError::AmbiguousComponent`].
    pub fn find_component(&self, type_name: &str) -> Result<Option<ComponentId>, DiscoveryError> {
        if let Some(id) = self.by_type.get(type_name) {
            return Ok(Some(*id));
        }

        let Some(component) = self.component_with_name(type_name) else {
            return Ok(None);
        };
        match component.primary_type() {
            Some(primary) if primary != type_name => Err(DiscoveryError::AmbiguousComponent {
                name: component.name().to_string(),
                component_type: primary.to_string(),
                referenced_type: type_name.to_string(),
            }),
            _ => Ok(Some(component.id())),
        }
    }

    /// Record a "uses" edge.
    ///
    /// Returns `false` for self-edges and for edges that already exist.
    pub fn add_dependency(
        &mut self,
        source: ComponentId,
        destination: ComponentId,
        description: &str,
    ) -> bool {
        if source == destination || self.components[source.0].uses(destination) {
            return false;
        }
        self.components[source.0].dependencies.push(Dependency {
            destination,
            description: description.to_string(),
        });
        true
    }

    /// All edges as (source, dependency) pairs.
    pub fn relationships(&self) -> impl Iterator<Item = (&Component, &Dependency)> {
        self.components
            .iter()
            .flat_map(|c| c.dependencies.iter().map(move |d| (c, d)))
    }

    pub fn relationship_count(&self) -> usize {
        self.components.iter().map(|c| c.dependencies.len()).sum()
    }
}
