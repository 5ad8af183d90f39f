//! Scan configuration schema.
//!
//! A scan configuration describes how to find components in one container:
//! which match strategies to run, which supporting-type strategies to apply,
//! how to treat duplicate names, and which packages and paths to consider.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::discovery::{
    AnnotationMatch, ComponentDiscovery, ComponentMatchStrategy, ComponentPackage,
    DependencyGraphBuilder, DuplicatePolicy, FirstImplementation, NameSuffixMatch,
    ReferencedTypes, RegexMatch, SupertypeMatch, SupportingTypeStrategy,
};

/// Top-level scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub version: String,
    /// Name of the container the components belong to.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technology: Option<String>,
    /// Package prefixes to scan; empty means everything.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Regexes over fully-qualified type names to hide from discovery.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Glob patterns for source paths to skip (e.g., "**/generated/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Duplicate component policy (default: fail_fast).
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Description attached to discovered dependencies.
    #[serde(default)]
    pub dependency_description: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRule>,
    #[serde(default)]
    pub supporting: Vec<SupportingRule>,
}

impl ScanConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: ScanConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Container name, defaulting to "Application".
    pub fn container_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Application"
        } else {
            &self.name
        }
    }

    /// Instantiate the configured match strategies in order.
    pub fn match_strategies(&self) -> anyhow::Result<Vec<Box<dyn ComponentMatchStrategy>>> {
        self.components.iter().map(ComponentRule::build).collect()
    }

    /// Instantiate the configured supporting-type strategies in order.
    pub fn supporting_strategies(&self) -> Vec<Box<dyn SupportingTypeStrategy>> {
        self.supporting.iter().map(SupportingRule::build).collect()
    }

    /// Build a discovery engine from this configuration.
    pub fn discovery(&self) -> anyhow::Result<ComponentDiscovery> {
        let mut discovery = ComponentDiscovery::new().duplicate_policy(self.duplicates);
        if let Some(description) = &self.dependency_description {
            discovery =
                discovery.graph_builder(DependencyGraphBuilder::new().with_description(description));
        }
        for strategy in self.match_strategies()? {
            discovery.add_strategy(strategy);
        }
        for strategy in self.supporting_strategies() {
            discovery.add_supporting(strategy);
        }
        Ok(discovery)
    }
}

/// One component match rule. Exactly one of `annotation`, `supertype`,
/// `name_suffix` or `regex` must be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ComponentRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technology: Option<String>,
    /// Annotation rules only: skip non-public types (default: false)
    #[serde(default)]
    pub public_only: Option<bool>,
}

impl ComponentRule {
    fn selector_count(&self) -> usize {
        [
            self.annotation.is_some(),
            self.supertype.is_some(),
            self.name_suffix.is_some(),
            self.regex.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    fn describe(&self) -> String {
        self.annotation
            .as_ref()
            .map(|a| format!("annotation {:?}", a))
            .or_else(|| self.supertype.as_ref().map(|s| format!("supertype {:?}", s)))
            .or_else(|| self.name_suffix.as_ref().map(|s| format!("name_suffix {:?}", s)))
            .or_else(|| self.regex.as_ref().map(|r| format!("regex {:?}", r)))
            .unwrap_or_else(|| "empty rule".to_string())
    }

    /// Build the strategy this rule describes.
    pub fn build(&self) -> anyhow::Result<Box<dyn ComponentMatchStrategy>> {
        if self.selector_count() != 1 {
            anyhow::bail!(
                "component rule ({}) must set exactly one of annotation, supertype, name_suffix or regex",
                self.describe()
            );
        }

        let description = self.description.clone().unwrap_or_default();
        let technology = self.technology.clone().unwrap_or_default();

        let strategy: Box<dyn ComponentMatchStrategy> = if let Some(tag) = &self.annotation {
            Box::new(
                AnnotationMatch::new(tag.as_str(), technology)
                    .with_description(description)
                    .public_only(self.public_only.unwrap_or(false)),
            )
        } else if let Some(supertype) = &self.supertype {
            Box::new(SupertypeMatch::new(supertype.as_str(), technology).with_description(description))
        } else if let Some(suffix) = &self.name_suffix {
            Box::new(NameSuffixMatch::new(suffix.as_str(), technology).with_description(description))
        } else if let Some(pattern) = &self.regex {
            Box::new(
                RegexMatch::new(pattern, technology)
                    .map_err(|e| anyhow::anyhow!("invalid component regex {:?}: {}", pattern, e))?
                    .with_description(description),
            )
        } else {
            unreachable!("selector_count checked above")
        };
        Ok(strategy)
    }
}

/// One supporting-type rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SupportingRule {
    ReferencedTypes {
        #[serde(default)]
        same_package_only: bool,
    },
    ComponentPackage,
    FirstImplementation,
}

impl SupportingRule {
    pub fn build(&self) -> Box<dyn SupportingTypeStrategy> {
        match self {
            SupportingRule::ReferencedTypes { same_package_only } => {
                Box::new(ReferencedTypes::new().same_package_only(*same_package_only))
            }
            SupportingRule::ComponentPackage => Box::new(ComponentPackage),
            SupportingRule::FirstImplementation => Box::new(FirstImplementation),
        }
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &ScanConfig) -> anyhow::Result<()> {
    if config.components.is_empty() {
        anyhow::bail!("no component rules configured");
    }

    // Validate component rules build (selectors and regexes)
    for rule in &config.components {
        rule.build()?;
    }

    // Validate exclusion regexes compile
    for pattern in &config.exclude {
        regex::Regex::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid exclude pattern {:?}: {}", pattern, e))?;
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1.0"
name: "Online Shop"
packages: [com.shop]
exclude: [".*Test$"]
duplicates: first_wins
components:
  - annotation: Service
    technology: Spring Service
    public_only: true
  - supertype: com.shop.core.Repository
    technology: JDBC
  - name_suffix: Gateway
  - regex: ".*\\.web\\..*Controller"
    description: "Web entry points"
supporting:
  - strategy: referenced_types
    same_package_only: true
  - strategy: first_implementation
"#;
        let config = ScanConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.container_name(), "Online Shop");
        assert_eq!(config.duplicates, DuplicatePolicy::FirstWins);
        assert_eq!(config.components.len(), 4);
        assert_eq!(
            config.supporting,
            vec![
                SupportingRule::ReferencedTypes {
                    same_package_only: true
                },
                SupportingRule::FirstImplementation,
            ]
        );
        validate(&config).unwrap();
        assert_eq!(config.match_strategies().unwrap().len(), 4);
        assert_eq!(config.supporting_strategies().len(), 2);
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::from_yaml_str("components: [{annotation: Service}]").unwrap();
        assert_eq!(config.duplicates, DuplicatePolicy::FailFast);
        assert_eq!(config.container_name(), "Application");
        assert!(config.supporting.is_empty());
    }

    #[test]
    fn test_rule_needs_exactly_one_selector() {
        let both = ComponentRule {
            annotation: Some("Service".to_string()),
            name_suffix: Some("Service".to_string()),
            ..Default::default()
        };
        assert!(both.build().is_err());
        assert!(ComponentRule::default().build().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_patterns() {
        let mut config = ScanConfig::from_yaml_str("components: [{regex: \"(\"}]").unwrap();
        assert!(validate(&config).is_err());

        config.components = vec![ComponentRule {
            annotation: Some("Service".to_string()),
            ..Default::default()
        }];
        config.exclude = vec!["[".to_string()];
        assert!(validate(&config).is_err());

        config.exclude.clear();
        validate(&config).unwrap();
    }

    #[test]
    fn test_validate_requires_components() {
        assert!(validate(&ScanConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_supporting_strategy() {
        let yaml = "components: [{annotation: A}]\nsupporting: [{strategy: everything}]";
        assert!(ScanConfig::from_yaml_str(yaml).is_err());
    }
}
