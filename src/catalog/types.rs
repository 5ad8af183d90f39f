//! Type facts held by a catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Structural category of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    #[default]
    Class,
    AbstractClass,
    Interface,
    Enum,
    Annotation,
}

impl TypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::Class => "class",
            TypeCategory::AbstractClass => "abstract class",
            TypeCategory::Interface => "interface",
            TypeCategory::Enum => "enum",
            TypeCategory::Annotation => "annotation",
        }
    }

    /// Interfaces and annotation types cannot be instantiated.
    pub fn is_interface_like(&self) -> bool {
        matches!(self, TypeCategory::Interface | TypeCategory::Annotation)
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared visibility of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        *self == Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a catalog knows about one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Fully-qualified name (`com.shop.Orders`, `com.shop.Orders.Line`).
    pub name: String,
    /// Package; derived from the name when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    #[serde(default)]
    pub category: TypeCategory,
    #[serde(default)]
    pub visibility: Visibility,
    /// Declared annotations or tags, as written or fully qualified.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Superclass and implemented/extended interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    /// Types referenced from fields, signatures and bodies.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub references: BTreeSet<String>,
    /// Nested/inner type.
    #[serde(default)]
    pub nested: bool,
}

impl TypeInfo {
    /// A public, top-level class with no tags or references.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            category: TypeCategory::default(),
            visibility: Visibility::default(),
            tags: BTreeSet::new(),
            supertypes: Vec::new(),
            references: BTreeSet::new(),
            nested: false,
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_category(mut self, category: TypeCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn with_reference(mut self, type_name: impl Into<String>) -> Self {
        self.references.insert(type_name.into());
        self
    }

    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Name without package or enclosing types.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Declared package, falling back to the name prefix.
    pub fn package(&self) -> &str {
        if self.package.is_empty() {
            package_of(&self.name)
        } else {
            &self.package
        }
    }

    /// Check whether the type carries `tag`.
    ///
    /// Qualified tags compare exactly. When either side is unqualified
    /// (an annotation whose import could not be resolved, or a short tag in
    /// configuration) the simple names are compared.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|declared| {
            declared == tag
                || ((!declared.contains('.') || !tag.contains('.'))
                    && simple_name(declared) == simple_name(tag))
        })
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }
}

/// Last segment of a dotted or binary (`Outer$Inner`) type name.
pub fn simple_name(type_name: &str) -> &str {
    type_name
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(type_name)
}

/// Everything before the last `.` of a type name, or "" for the default package.
pub fn package_of(type_name: &str) -> &str {
    type_name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("com.shop.Orders"), "Orders");
        assert_eq!(simple_name("com.shop.Orders$Line"), "Line");
        assert_eq!(simple_name("Orders"), "Orders");
    }

    #[test]
    fn test_package_falls_back_to_name_prefix() {
        let derived = TypeInfo::new("com.shop.Orders");
        assert_eq!(derived.package(), "com.shop");

        let nested = TypeInfo::new("com.shop.Orders.Line").with_package("com.shop");
        assert_eq!(nested.package(), "com.shop");

        assert_eq!(TypeInfo::new("Orders").package(), "");
    }

    #[test]
    fn test_has_tag_matches_simple_and_qualified_names() {
        let info = TypeInfo::new("com.shop.Orders")
            .with_tag("org.springframework.stereotype.Service")
            .with_tag("Transactional");

        assert!(info.has_tag("Service"));
        assert!(info.has_tag("org.springframework.stereotype.Service"));
        assert!(info.has_tag("javax.transaction.Transactional"));
        assert!(!info.has_tag("com.other.Service"));
        assert!(!info.has_tag("Repository"));
    }

    #[test]
    fn test_manifest_defaults() {
        let info: TypeInfo = serde_yaml::from_str("name: com.shop.Orders").unwrap();
        assert_eq!(info.category, TypeCategory::Class);
        assert_eq!(info.visibility, Visibility::Public);
        assert!(!info.nested);
        assert!(info.tags.is_empty());
    }
}
