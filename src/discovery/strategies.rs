//! Strategies that decide which types become components.
//!
//! Each strategy inspects the catalog and proposes [`Candidate`]s. The
//! engine runs them in configured order and registers the union.

use regex::Regex;

use crate::catalog::{simple_name, TypeCatalog, TypeInfo};
use crate::error::CatalogError;

/// A proposed component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate {
    /// Fully-qualified name of the backing type.
    pub type_name: String,
    /// Component name; the type's simple name unless overridden.
    pub name: String,
    pub description: String,
    pub technology: String,
}

impl Candidate {
    /// A candidate named after the simple name of its type.
    pub fn for_type(type_name: &str, description: &str, technology: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: simple_name(type_name).to_string(),
            description: description.to_string(),
            technology: technology.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Finds types that should become components.
pub trait ComponentMatchStrategy {
    /// Short human-readable label for logs and reports.
    fn label(&self) -> String;

    /// Propose components. Must not depend on anything but the catalog.
    fn find_candidates(&self, catalog: &dyn TypeCatalog) -> Result<Vec<Candidate>, CatalogError>;
}

/// Collect candidates from every non-nested catalog type accepted by `accept`.
fn candidates_where<F>(
    catalog: &dyn TypeCatalog,
    description: &str,
    technology: &str,
    mut accept: F,
) -> Result<Vec<Candidate>, CatalogError>
where
    F: FnMut(&TypeInfo) -> Result<bool, CatalogError>,
{
    let mut candidates = Vec::new();
    for name in catalog.type_names() {
        let Some(info) = catalog.lookup(name)? else {
            continue;
        };
        if !info.nested && accept(info)? {
            candidates.push(Candidate::for_type(&info.name, description, technology));
        }
    }
    Ok(candidates)
}

/// Matches types declaring an annotation or tag.
#[derive(Debug, Clone)]
pub struct AnnotationMatch {
    tag: String,
    description: String,
    technology: String,
    public_only: bool,
}

impl AnnotationMatch {
    pub fn new(tag: impl Into<String>, technology: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            description: String::new(),
            technology: technology.into(),
            public_only: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Only match public types.
    pub fn public_only(mut self, public_only: bool) -> Self {
        self.public_only = public_only;
        self
    }
}

impl ComponentMatchStrategy for AnnotationMatch {
    fn label(&self) -> String {
        format!("annotation @{}", self.tag)
    }

    fn find_candidates(&self, catalog: &dyn TypeCatalog) -> Result<Vec<Candidate>, CatalogError> {
        let mut candidates = Vec::new();
        for name in catalog.find_by_tag(&self.tag)? {
            let Some(info) = catalog.lookup(&name)? else {
                continue;
            };
            if info.nested || (self.public_only && !info.is_public()) {
                continue;
            }
            candidates.push(Candidate::for_type(
                &info.name,
                &self.description,
                &self.technology,
            ));
        }
        Ok(candidates)
    }
}

/// Matches types that extend or implement a marker type.
#[derive(Debug, Clone)]
pub struct SupertypeMatch {
    supertype: String,
    description: String,
    technology: String,
}

impl SupertypeMatch {
    pub fn new(supertype: impl Into<String>, technology: impl Into<String>) -> Self {
        Self {
            supertype: supertype.into(),
            description: String::new(),
            technology: technology.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl ComponentMatchStrategy for SupertypeMatch {
    fn label(&self) -> String {
        format!("subtypes of {}", self.supertype)
    }

    fn find_candidates(&self, catalog: &dyn TypeCatalog) -> Result<Vec<Candidate>, CatalogError> {
        candidates_where(catalog, &self.description, &self.technology, |info| {
            if info.name == self.supertype {
                return Ok(false);
            }
            catalog.is_subtype_of(&info.name, &self.supertype)
        })
    }
}

/// Matches types whose fully-qualified name ends with a suffix.
#[derive(Debug, Clone)]
pub struct NameSuffixMatch {
    suffix: String,
    description: String,
    technology: String,
}

impl NameSuffixMatch {
    pub fn new(suffix: impl Into<String>, technology: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            description: String::new(),
            technology: technology.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl ComponentMatchStrategy for NameSuffixMatch {
    fn label(&self) -> String {
        format!("names ending with {}", self.suffix)
    }

    fn find_candidates(&self, catalog: &dyn TypeCatalog) -> Result<Vec<Candidate>, CatalogError> {
        candidates_where(catalog, &self.description, &self.technology, |info| {
            Ok(info.name.ends_with(&self.suffix))
        })
    }
}

/// Matches types whose fully-qualified name matches a regex.
#[derive(Debug, Clone)]
pub struct RegexMatch {
    pattern: Regex,
    description: String,
    technology: String,
}

impl RegexMatch {
    pub fn new(pattern: &str, technology: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            description: String::new(),
            technology: technology.into(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl ComponentMatchStrategy for RegexMatch {
    fn label(&self) -> String {
        format!("names matching /{}/", self.pattern.as_str())
    }

    fn find_candidates(&self, catalog: &dyn TypeCatalog) -> Result<Vec<Candidate>, CatalogError> {
        candidates_where(catalog, &self.description, &self.technology, |info| {
            Ok(self.pattern.is_match(&info.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManifestCatalog, TypeCategory, Visibility};

    fn catalog() -> ManifestCatalog {
        ManifestCatalog::from_types([
            TypeInfo::new("com.shop.web.OrderController").with_tag("Controller"),
            TypeInfo::new("com.shop.web.AdminController")
                .with_tag("Controller")
                .with_visibility(Visibility::Package),
            TypeInfo::new("com.shop.web.OrderController.Form")
                .with_package("com.shop.web")
                .with_tag("Controller")
                .nested(true),
            TypeInfo::new("com.shop.core.Repository").with_category(TypeCategory::Interface),
            TypeInfo::new("com.shop.core.AbstractRepository")
                .with_category(TypeCategory::AbstractClass)
                .with_supertype("com.shop.core.Repository"),
            TypeInfo::new("com.shop.core.JdbcOrderRepository")
                .with_supertype("com.shop.core.AbstractRepository"),
            TypeInfo::new("com.shop.core.OrderMapper"),
        ])
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_annotation_match() {
        let catalog = catalog();
        let strategy = AnnotationMatch::new("Controller", "Spring MVC Controller");
        let found = strategy.find_candidates(&catalog).unwrap();

        assert_eq!(names(&found), vec!["AdminController", "OrderController"]);
        assert!(found.iter().all(|c| c.technology == "Spring MVC Controller"));
    }

    #[test]
    fn test_annotation_match_public_only() {
        let catalog = catalog();
        let strategy = AnnotationMatch::new("Controller", "Spring").public_only(true);
        let found = strategy.find_candidates(&catalog).unwrap();
        assert_eq!(names(&found), vec!["OrderController"]);
    }

    #[test]
    fn test_supertype_match_is_transitive() {
        let catalog = catalog();
        let strategy = SupertypeMatch::new("com.shop.core.Repository", "JDBC");
        let found = strategy.find_candidates(&catalog).unwrap();
        assert_eq!(names(&found), vec!["AbstractRepository", "JdbcOrderRepository"]);
    }

    #[test]
    fn test_name_suffix_match() {
        let catalog = catalog();
        let strategy = NameSuffixMatch::new("Mapper", "MyBatis").with_description("Maps rows");
        let found = strategy.find_candidates(&catalog).unwrap();
        assert_eq!(names(&found), vec!["OrderMapper"]);
        assert_eq!(found[0].description, "Maps rows");
    }

    #[test]
    fn test_regex_match_skips_nested_types() {
        let catalog = catalog();
        let strategy = RegexMatch::new(r"^com\.shop\.web\..*", "Web").unwrap();
        let found = strategy.find_candidates(&catalog).unwrap();
        assert_eq!(names(&found), vec!["AdminController", "OrderController"]);
    }

    #[test]
    fn test_candidate_name_override() {
        let c = Candidate::for_type("a.b.Orders", "", "").with_name("Order Service");
        assert_eq!(c.name, "Order Service");
        assert_eq!(c.type_name, "a.b.Orders");
    }
}
