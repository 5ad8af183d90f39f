//! Output formatting for discovery results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::model::{CodeElement, CodeElementRole, Component, ComponentRegistry};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub config: String,
    pub container: JsonContainer,
    pub types_scanned: usize,
    pub components: Vec<JsonComponent>,
    pub dependency_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub technology: String,
}

/// JSON component structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub technology: String,
    pub code: Vec<CodeElement>,
    pub uses: Vec<JsonDependency>,
}

/// Outgoing "uses" edge, by destination component name.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDependency {
    pub destination: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Components sorted by name for stable output.
fn sorted_components(registry: &ComponentRegistry) -> Vec<&Component> {
    let mut components: Vec<&Component> = registry.components().iter().collect();
    components.sort_by(|a, b| a.name().cmp(b.name()));
    components
}

fn component_to_json(registry: &ComponentRegistry, component: &Component) -> JsonComponent {
    let mut uses: Vec<JsonDependency> = component
        .dependencies()
        .iter()
        .map(|d| JsonDependency {
            destination: registry.component(d.destination).name().to_string(),
            description: d.description.clone(),
        })
        .collect();
    uses.sort_by(|a, b| a.destination.cmp(&b.destination));

    JsonComponent {
        name: component.name().to_string(),
        description: component.description().to_string(),
        technology: component.technology().to_string(),
        code: component.code().to_vec(),
        uses,
    }
}

/// Build the JSON report for a finished discovery run.
pub fn json_report(
    path: &str,
    config_path: &str,
    types_scanned: usize,
    registry: &ComponentRegistry,
) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.to_string(),
        container: JsonContainer {
            name: registry.name().to_string(),
            description: registry.description().to_string(),
            technology: registry.technology().to_string(),
        },
        types_scanned,
        components: sorted_components(registry)
            .into_iter()
            .map(|c| component_to_json(registry, c))
            .collect(),
        dependency_count: registry.relationship_count(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: &str,
    types_scanned: usize,
    registry: &ComponentRegistry,
) -> anyhow::Result<()> {
    let report = json_report(path, config_path, types_scanned, registry);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    config_path: &str,
    types_scanned: usize,
    registry: &ComponentRegistry,
) {
    // Header
    println!();
    print!("  ");
    print!("{}", "compscan".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning:  ".dimmed());
    println!("{} ({} types)", path, types_scanned);
    print!("  {}", "Config:    ".dimmed());
    println!("{}", config_path);
    print!("  {}", "Container: ".dimmed());
    print!("{}", registry.name().bold());
    if !registry.technology().is_empty() {
        print!("  {}", format!("[{}]", registry.technology()).dimmed());
    }
    println!();
    println!();

    if registry.is_empty() {
        println!("  {}", "No components found".yellow());
        println!();
        return;
    }

    println!("  {} ({}):", "Components".bold(), registry.len());
    println!();
    for component in sorted_components(registry) {
        write_component(registry, component);
        println!();
    }

    write_summary(registry);
    println!();
}

fn write_component(registry: &ComponentRegistry, component: &Component) {
    print!("    {}", component.name().green().bold());
    if !component.technology().is_empty() {
        print!("  {}", format!("[{}]", component.technology()).dimmed());
    }
    println!();

    if !component.description().is_empty() {
        println!("      {}", component.description());
    }

    for element in component.code() {
        write_code_element(element);
    }

    let mut destinations: Vec<(&str, &str)> = component
        .dependencies()
        .iter()
        .map(|d| (registry.component(d.destination).name(), d.description.as_str()))
        .collect();
    destinations.sort();
    for (name, description) in destinations {
        print!("      {} {}", "→".cyan(), name);
        if !description.is_empty() {
            print!("  {}", format!("({})", description).dimmed());
        }
        println!();
    }
}

fn write_code_element(element: &CodeElement) {
    let marker = match element.role {
        CodeElementRole::Primary => "■".blue(),
        CodeElementRole::Supporting => "·".dimmed(),
    };
    print!("      {} {}", marker, element.type_name.blue());

    let facts: Vec<&str> = [
        element.visibility.map(|v| v.as_str()),
        element.category.map(|c| c.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !facts.is_empty() {
        print!("  {}", facts.join(" ").dimmed());
    }
    println!();
}

fn write_summary(registry: &ComponentRegistry) {
    let count = registry.relationship_count();
    let plural = if count != 1 { "ies" } else { "y" };
    println!(
        "  {} components, {} dependenc{}",
        registry.len(),
        count,
        plural
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new("Web").with_technology("Spring Boot");
        let service = registry
            .add_component("OrderService", Some("com.shop.OrderService"), "", "Spring Service")
            .unwrap();
        let controller = registry
            .add_component("OrderController", Some("com.shop.OrderController"), "", "")
            .unwrap();
        let repository = registry
            .add_component("OrderRepository", Some("com.shop.OrderRepository"), "", "")
            .unwrap();
        registry.add_dependency(controller, service, "");
        registry.add_dependency(service, repository, "reads");
        registry
    }

    #[test]
    fn test_json_report_sorts_components() {
        let report = json_report("src", "compscan.yaml", 5, &registry());

        let names: Vec<&str> = report.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["OrderController", "OrderRepository", "OrderService"]);
        assert_eq!(report.container.technology, "Spring Boot");
        assert_eq!(report.dependency_count, 2);

        let service = &report.components[2];
        assert_eq!(service.uses.len(), 1);
        assert_eq!(service.uses[0].destination, "OrderRepository");
        assert_eq!(service.uses[0].description, "reads");
        assert_eq!(service.code[0].type_name, "com.shop.OrderService");
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let report = json_report("src", "compscan.yaml", 5, &registry());
        let json = serde_json::to_value(&report).unwrap();

        let controller = &json["components"][0];
        assert!(controller.get("technology").is_none());
        assert_eq!(controller["uses"][0]["destination"], "OrderService");
        assert!(controller["uses"][0].get("description").is_none());
        assert_eq!(controller["code"][0]["role"], "primary");
    }
}
