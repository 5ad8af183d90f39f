//! Catalog view limited to selected packages, minus excluded types.

use regex::Regex;
use std::collections::BTreeSet;

use super::{TypeCatalog, TypeInfo};
use crate::error::CatalogError;

/// Restricts a catalog to types under a set of package prefixes and hides
/// types whose names match any exclusion pattern.
///
/// Hidden types behave exactly like types the underlying catalog never knew:
/// they are absent from lookups and filtered out of reference sets, so the
/// dependency walk never passes through them.
pub struct ScopedCatalog<'a> {
    inner: &'a dyn TypeCatalog,
    packages: Vec<String>,
    exclusions: Vec<Regex>,
}

impl<'a> ScopedCatalog<'a> {
    /// A view that hides nothing.
    pub fn new(inner: &'a dyn TypeCatalog) -> Self {
        Self {
            inner,
            packages: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    /// Only expose types in these packages or their subpackages.
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(
            packages
                .into_iter()
                .map(Into::into)
                .map(|p| p.trim_end_matches('.').to_string())
                .filter(|p| !p.is_empty()),
        );
        self
    }

    /// Hide types whose fully-qualified name matches any of these regexes.
    pub fn with_exclusions<I, S>(mut self, patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.exclusions.push(Regex::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Whether a type name is inside the scope.
    pub fn is_visible(&self, type_name: &str) -> bool {
        let in_packages = self.packages.is_empty()
            || self.packages.iter().any(|pkg| {
                type_name
                    .strip_prefix(pkg.as_str())
                    .map(|rest| rest.starts_with('.'))
                    .unwrap_or(false)
            });

        in_packages && !self.exclusions.iter().any(|re| re.is_match(type_name))
    }
}

impl TypeCatalog for ScopedCatalog<'_> {
    fn lookup(&self, type_name: &str) -> Result<Option<&TypeInfo>, CatalogError> {
        if !self.is_visible(type_name) {
            return Ok(None);
        }
        self.inner.lookup(type_name)
    }

    fn type_names(&self) -> Vec<&str> {
        self.inner
            .type_names()
            .into_iter()
            .filter(|name| self.is_visible(name))
            .collect()
    }

    fn find_by_tag(&self, tag: &str) -> Result<BTreeSet<String>, CatalogError> {
        let mut found = self.inner.find_by_tag(tag)?;
        found.retain(|name| self.is_visible(name));
        Ok(found)
    }

    fn referenced_types(&self, type_name: &str) -> Result<BTreeSet<String>, CatalogError> {
        if !self.is_visible(type_name) {
            return Ok(BTreeSet::new());
        }
        let mut references = self.inner.referenced_types(type_name)?;
        references.retain(|name| self.is_visible(name));
        Ok(references)
    }
}
