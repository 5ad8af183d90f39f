//! Classification of code elements from catalog facts.

use crate::catalog::{TypeCatalog, TypeCategory, Visibility};

/// Visibility of a type, or `None` if the catalog cannot tell.
pub fn visibility(catalog: &dyn TypeCatalog, type_name: &str) -> Option<Visibility> {
    classify(catalog, type_name).0
}

/// Category of a type, or `None` if the catalog cannot tell.
pub fn category(catalog: &dyn TypeCatalog, type_name: &str) -> Option<TypeCategory> {
    classify(catalog, type_name).1
}

/// Visibility and category from a single lookup.
///
/// Lookup failures are logged and classify as unknown.
pub fn classify(
    catalog: &dyn TypeCatalog,
    type_name: &str,
) -> (Option<Visibility>, Option<TypeCategory>) {
    match catalog.lookup(type_name) {
        Ok(Some(info)) => (Some(info.visibility), Some(info.category)),
        Ok(None) => (None, None),
        Err(e) => {
            tracing::warn!("cannot classify {}: {}", type_name, e);
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManifestCatalog, TypeInfo};

    #[test]
    fn test_classify_known_type() {
        let catalog = ManifestCatalog::from_types([TypeInfo::new("a.Repo")
            .with_category(TypeCategory::Interface)
            .with_visibility(Visibility::Package)]);

        assert_eq!(visibility(&catalog, "a.Repo"), Some(Visibility::Package));
        assert_eq!(category(&catalog, "a.Repo"), Some(TypeCategory::Interface));
    }

    #[test]
    fn test_classify_unknown_type() {
        let catalog = ManifestCatalog::new();
        assert_eq!(classify(&catalog, "a.Missing"), (None, None));
    }
}
