//! Error types for catalog lookups and component discovery.

use thiserror::Error;

/// Errors raised by a [`TypeCatalog`](crate::catalog::TypeCatalog).
///
/// An unknown type is not an error: lookups return `Ok(None)` for that.
/// These variants cover catalogs that know a type exists but cannot
/// describe it, or catalogs that could not be loaded at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unable to resolve type {type_name}: {reason}")]
    Unresolved { type_name: String, reason: String },
    #[error("invalid type manifest: {0}")]
    Manifest(String),
}

impl CatalogError {
    pub fn unresolved(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::Unresolved {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort a discovery run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("duplicate component {name:?}: already backed by {existing_type:?}, proposed {proposed_type:?}")]
    DuplicateComponent {
        name: String,
        existing_type: Option<String>,
        proposed_type: Option<String>,
    },
    #[error("component {name:?} matched {referenced_type} by name but is backed by {component_type}")]
    AmbiguousComponent {
        name: String,
        component_type: String,
        referenced_type: String,
    },
}

impl DiscoveryError {
    /// Whether this error stems from setup rather than catalog contents.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Configuration(_) | DiscoveryError::AmbiguousComponent { .. }
        )
    }
}
