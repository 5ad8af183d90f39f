//! Compscan - component discovery for Java codebases.
//!
//! Compscan finds the architectural components of a container (controllers,
//! services, repositories, or anything a rule can describe) in a catalog of
//! types, attaches the types that support each component, and derives the
//! "uses" relationships between components from type references.
//!
//! # Architecture
//!
//! - `catalog`: The `TypeCatalog` contract, manifest and scoped catalogs,
//!   and the tree-sitter Java source reader
//! - `classify`: Visibility and category lookup for code elements
//! - `model`: Components, code elements and the component registry
//! - `discovery`: Match strategies, supporting-type strategies, duplicate
//!   policy, the discovery engine and the dependency graph builder
//! - `config`: YAML scan configuration schema
//! - `report`: Output formatting (text, JSON)
//!
//! # Example
//!
//! ```
//! use compscan::catalog::{ManifestCatalog, TypeInfo};
//! use compscan::discovery::{AnnotationMatch, ComponentDiscovery};
//! use compscan::model::ComponentRegistry;
//!
//! let catalog = ManifestCatalog::from_types([
//!     TypeInfo::new("com.shop.OrderService")
//!         .with_tag("Service")
//!         .with_reference("com.shop.OrderRepository"),
//!     TypeInfo::new("com.shop.OrderRepository").with_tag("Repository"),
//! ]);
//!
//! let mut registry = ComponentRegistry::new("Shop");
//! ComponentDiscovery::new()
//!     .with_strategy(AnnotationMatch::new("Service", "Spring Service"))
//!     .with_strategy(AnnotationMatch::new("Repository", "Spring Repository"))
//!     .run(&mut registry, &catalog)
//!     .unwrap();
//!
//! let service = registry.component_with_name("OrderService").unwrap();
//! let repository = registry.component_with_name("OrderRepository").unwrap();
//! assert!(service.uses(repository.id()));
//! ```

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod report;

pub use catalog::{ManifestCatalog, ScopedCatalog, TypeCatalog, TypeInfo};
pub use config::ScanConfig;
pub use discovery::{discover_components, ComponentDiscovery, DuplicatePolicy};
pub use error::{CatalogError, DiscoveryError};
pub use model::{Component, ComponentId, ComponentRegistry};
