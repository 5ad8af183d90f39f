//! Component discovery and dependency-graph construction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌───────────────────┐
//! │ TypeCatalog │──▶│ Match strategies │──▶│ ComponentRegistry │
//! └─────────────┘   └──────────────────┘   │ (DuplicatePolicy) │
//!        │                                 └───────────────────┘
//!        │          ┌──────────────────┐             │
//!        ├─────────▶│ Classification + │◀────────────┤
//!        │          │ supporting types │             │
//!        │          └──────────────────┘             ▼
//!        │                                 ┌───────────────────┐
//!        └────────────────────────────────▶│ Dependency graph  │
//!                                          └───────────────────┘
//! ```
//!
//! # Adding a Strategy
//!
//! Implement [`ComponentMatchStrategy`] or [`SupportingTypeStrategy`] and
//! pass it to [`ComponentDiscovery`]. To make it configurable, add a key to
//! `ComponentRule` or a variant to `SupportingRule` in `config.rs`.

mod duplicates;
mod engine;
mod graph;
mod strategies;
mod supporting;

pub use duplicates::DuplicatePolicy;
pub use engine::{discover_components, ComponentDiscovery};
pub use graph::DependencyGraphBuilder;
pub use strategies::{
    AnnotationMatch, Candidate, ComponentMatchStrategy, NameSuffixMatch, RegexMatch,
    SupertypeMatch,
};
pub use supporting::{ComponentPackage, FirstImplementation, ReferencedTypes, SupportingTypeStrategy};
