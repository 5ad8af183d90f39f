//! What to do when two proposals share a component name.

use serde::{Deserialize, Serialize};

use super::Candidate;
use crate::error::DiscoveryError;
use crate::model::{ComponentId, ComponentRegistry};

/// Resolution of component name collisions.
///
/// Only names collide; two components backed by the same type under
/// different names are not duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort discovery with [`DiscoveryError::DuplicateComponent`].
    #[default]
    FailFast,
    /// Keep the existing component and discard the proposal.
    FirstWins,
    /// Replace the existing component's type, description and technology.
    Overwrite,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::FailFast => "fail_fast",
            DuplicatePolicy::FirstWins => "first_wins",
            DuplicatePolicy::Overwrite => "overwrite",
        }
    }

    /// Register `proposal`, consulting this policy if its name is taken.
    pub fn register(
        &self,
        registry: &mut ComponentRegistry,
        proposal: &Candidate,
    ) -> Result<ComponentId, DiscoveryError> {
        match registry.component_with_name(&proposal.name).map(|c| c.id()) {
            Some(existing) => self.on_duplicate(registry, existing, proposal),
            None => registry.add_component(
                &proposal.name,
                Some(&proposal.type_name),
                &proposal.description,
                &proposal.technology,
            ),
        }
    }

    /// Resolve a collision between `existing` and `proposal`.
    pub fn on_duplicate(
        &self,
        registry: &mut ComponentRegistry,
        existing: ComponentId,
        proposal: &Candidate,
    ) -> Result<ComponentId, DiscoveryError> {
        match self {
            DuplicatePolicy::FailFast => {
                let component = registry.component(existing);
                Err(DiscoveryError::DuplicateComponent {
                    name: component.name().to_string(),
                    existing_type: component.primary_type().map(str::to_string),
                    proposed_type: Some(proposal.type_name.clone()),
                })
            }
            DuplicatePolicy::FirstWins => {
                tracing::debug!(
                    "ignoring duplicate component {} ({})",
                    proposal.name,
                    proposal.type_name
                );
                Ok(existing)
            }
            DuplicatePolicy::Overwrite => {
                tracing::debug!(
                    "overwriting component {} with {}",
                    proposal.name,
                    proposal.type_name
                );
                registry.overwrite(
                    existing,
                    Some(&proposal.type_name),
                    &proposal.description,
                    &proposal.technology,
                );
                Ok(existing)
            }
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" | "fail" => Ok(DuplicatePolicy::FailFast),
            "first_wins" | "ignore" => Ok(DuplicatePolicy::FirstWins),
            "overwrite" | "last_wins" => Ok(DuplicatePolicy::Overwrite),
            _ => Err(format!("unknown duplicate policy: {}", s)),
        }
    }
}
