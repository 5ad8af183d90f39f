//! Architecture model consumed and produced by discovery.
//!
//! A [`ComponentRegistry`] stands in for a container: it owns the discovered
//! [`Component`]s, their [`CodeElement`]s and the [`Dependency`] edges
//! between them. Exporters read it as a graph where nodes are components and
//! edges are "uses" relationships.

mod component;
mod registry;

pub use component::{CodeElement, CodeElementRole, Component, ComponentId, Dependency};
pub use registry::ComponentRegistry;
