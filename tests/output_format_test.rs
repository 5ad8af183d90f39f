//! Tests for the JSON output format.
//!
//! These tests verify the JSON report produced for the manifest fixture, so
//! downstream tooling can rely on its shape.

use std::path::PathBuf;

use compscan::catalog::{ManifestCatalog, ScopedCatalog, TypeCatalog};
use compscan::config::ScanConfig;
use compscan::model::ComponentRegistry;
use compscan::report::{json_report, JsonReport};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Run discovery on the manifest fixture and return the JSON report.
fn run_and_get_json() -> JsonReport {
    let testdata = testdata_path();
    let config = ScanConfig::parse_file(testdata.join("shop-config.yaml")).expect("should parse config");
    let catalog = ManifestCatalog::load(testdata.join("shop-manifest.yaml")).expect("should load manifest");
    let scoped = ScopedCatalog::new(&catalog)
        .with_packages(config.packages.iter())
        .with_exclusions(config.exclude.iter())
        .unwrap();

    let mut registry = ComponentRegistry::new(config.container_name())
        .with_technology(config.technology.clone().unwrap_or_default());
    config
        .discovery()
        .unwrap()
        .run(&mut registry, &scoped)
        .expect("discovery should succeed");

    json_report(
        "testdata",
        "testdata/shop-config.yaml",
        scoped.type_names().len(),
        &registry,
    )
}

#[test]
fn test_json_top_level_fields() {
    let report = run_and_get_json();

    assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(report.path, "testdata");
    assert_eq!(report.config, "testdata/shop-config.yaml");
    assert_eq!(report.container.name, "Online Shop");
    assert_eq!(report.container.technology, "Spring Boot");
    // Test type and out-of-package type are not counted
    assert_eq!(report.types_scanned, 6);
    assert_eq!(report.dependency_count, 2);
}

#[test]
fn test_json_components() {
    let report = run_and_get_json();

    let names: Vec<&str> = report.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["OrderController", "OrderRepository", "OrderService"]);

    let controller = &report.components[0];
    assert_eq!(controller.technology, "Spring MVC Controller");
    assert_eq!(controller.uses.len(), 1);
    assert_eq!(controller.uses[0].destination, "OrderService");
    assert_eq!(controller.uses[0].description, "Uses");
}

#[test]
fn test_json_code_elements() {
    let report = run_and_get_json();
    let json = serde_json::to_value(&report).unwrap();

    let service = &json["components"][2];
    assert_eq!(service["name"], "OrderService");

    let code = service["code"].as_array().unwrap();
    assert_eq!(code[0]["type_name"], "com.shop.orders.OrderService");
    assert_eq!(code[0]["role"], "primary");
    assert_eq!(code[0]["category"], "interface");
    assert_eq!(code[0]["visibility"], "public");

    let supporting: Vec<&str> = code[1..]
        .iter()
        .map(|c| c["type_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        supporting,
        vec!["com.shop.orders.OrderServiceImpl", "com.shop.orders.Order"]
    );
    assert!(code[1..].iter().all(|c| c["role"] == "supporting"));
}

#[test]
fn test_json_round_trips() {
    let report = run_and_get_json();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: JsonReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.components.len(), report.components.len());
}
