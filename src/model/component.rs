//! Components, their code elements and outgoing dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{TypeCategory, Visibility};

/// Index of a component within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a code element relates to its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeElementRole {
    /// The type the component represents.
    Primary,
    /// A type that belongs to the component without being one.
    Supporting,
}

impl fmt::Display for CodeElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeElementRole::Primary => write!(f, "primary"),
            CodeElementRole::Supporting => write!(f, "supporting"),
        }
    }
}

/// A type attached to a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    pub type_name: String,
    pub role: CodeElementRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TypeCategory>,
}

impl CodeElement {
    pub fn new(type_name: impl Into<String>, role: CodeElementRole) -> Self {
        Self {
            type_name: type_name.into(),
            role,
            visibility: None,
            category: None,
        }
    }

    /// Record classification results; unknown values leave the field untouched.
    pub fn classify(&mut self, visibility: Option<Visibility>, category: Option<TypeCategory>) {
        if visibility.is_some() {
            self.visibility = visibility;
        }
        if category.is_some() {
            self.category = category;
        }
    }
}

/// An outgoing "uses" edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub destination: ComponentId,
    #[serde(default)]
    pub description: String,
}

/// A discovered architectural building block.
///
/// Components are created and mutated only through
/// [`ComponentRegistry`](super::ComponentRegistry), which keeps the
/// name and type indexes consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) technology: String,
    pub(crate) code: Vec<CodeElement>,
    pub(crate) dependencies: Vec<Dependency>,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        name: &str,
        type_name: Option<&str>,
        description: &str,
        technology: &str,
    ) -> Self {
        let code = type_name
            .filter(|t| !t.is_empty())
            .map(|t| vec![CodeElement::new(t, CodeElementRole::Primary)])
            .unwrap_or_default();

        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            technology: technology.to_string(),
            code,
            dependencies: Vec::new(),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
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

    /// The primary code element, if the component is backed by a type.
    pub fn primary(&self) -> Option<&CodeElement> {
        self.code
            .iter()
            .find(|c| c.role == CodeElementRole::Primary)
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.primary().map(|c| c.type_name.as_str())
    }

    /// Category of the primary type.
    pub fn category(&self) -> Option<TypeCategory> {
        self.primary().and_then(|c| c.category)
    }

    /// Visibility of the primary type.
    pub fn visibility(&self) -> Option<Visibility> {
        self.primary().and_then(|c| c.visibility)
    }

    /// All code elements, primary first.
    pub fn code(&self) -> &[CodeElement] {
        &self.code
    }

    pub fn supporting_types(&self) -> impl Iterator<Item = &CodeElement> {
        self.code
            .iter()
            .filter(|c| c.role == CodeElementRole::Supporting)
    }

    /// Whether any code element of this component is `type_name`.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.code.iter().any(|c| c.type_name == type_name)
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Whether this component has an edge to `destination`.
    pub fn uses(&self, destination: ComponentId) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.destination == destination)
    }

    pub(crate) fn code_mut(&mut self) -> &mut Vec<CodeElement> {
        &mut self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_without_type_has_no_code() {
        let c = Component::new(ComponentId(0), "Gateway", None, "", "");
        assert!(c.primary().is_none());
        assert!(c.code().is_empty());

        let empty = Component::new(ComponentId(1), "Gateway", Some(""), "", "");
        assert!(empty.code().is_empty());
    }

    #[test]
    fn test_primary_element() {
        let c = Component::new(ComponentId(0), "Orders", Some("a.Orders"), "d", "t");
        assert_eq!(c.primary_type(), Some("a.Orders"));
        assert!(c.has_type("a.Orders"));
        assert_eq!(c.supporting_types().count(), 0);
    }

    #[test]
    fn test_classify_keeps_known_values() {
        let mut element = CodeElement::new("a.Orders", CodeElementRole::Primary);
        element.classify(Some(Visibility::Public), Some(TypeCategory::Class));
        element.classify(None, None);
        assert_eq!(element.visibility, Some(Visibility::Public));
        assert_eq!(element.category, Some(TypeCategory::Class));
    }
}
