//! Command-line interface for compscan.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::catalog::{ManifestCatalog, ScopedCatalog, TypeCatalog};
use crate::config::{self, ScanConfig};
use crate::discovery::DuplicatePolicy;
use crate::model::ComponentRegistry;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["compscan.yaml", ".compscan.yaml"];

/// Discover architectural components and their dependencies in Java code.
///
/// Compscan reads a type catalog (parsed from Java sources or loaded from a
/// manifest), finds components using the rules in a scan configuration, and
/// reports each component with its code and the components it uses.
#[derive(Parser)]
#[command(name = "compscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover components and their dependencies
    #[command(visible_alias = "discover")]
    Scan(ScanArgs),
    /// Create a new compscan config from a template
    Init(InitArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Source root to scan (directory or single .java file)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read types from a YAML/JSON manifest instead of parsing sources
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Also write the type catalog as a YAML manifest to this file
    #[arg(long)]
    pub dump_catalog: Option<PathBuf>,

    /// Override the config's duplicate policy (fail_fast, first_wins, overwrite)
    #[arg(long)]
    pub duplicates: Option<DuplicatePolicy>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "compscan.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "minimal")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "minimal",
        description: "Components by class name suffix, no framework assumptions",
        content: include_str!("templates/minimal.yaml"),
    },
    Template {
        name: "spring",
        description: "Spring stereotypes and Spring Data repositories",
        content: include_str!("templates/spring.yaml"),
    },
];

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("compscan={}", default_level)));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Discover a config file in the current directory.
fn discover_config() -> anyhow::Result<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no config file found (looked for {})",
        DEFAULT_CONFIG_NAMES.join(", ")
    )
}

/// Load the type catalog for a scan.
fn load_catalog(args: &ScanArgs, root: &Path, config: &ScanConfig) -> anyhow::Result<ManifestCatalog> {
    if let Some(manifest) = &args.catalog {
        tracing::info!("loading catalog manifest {}", manifest.display());
        return ManifestCatalog::load(manifest);
    }
    build_source_catalog(root, config)
}

#[cfg(feature = "tree-sitter")]
fn build_source_catalog(root: &Path, config: &ScanConfig) -> anyhow::Result<ManifestCatalog> {
    crate::catalog::JavaCatalogBuilder::new(root)
        .excluded_paths(config.excluded_paths.iter().cloned())
        .build()
}

#[cfg(not(feature = "tree-sitter"))]
fn build_source_catalog(_root: &Path, _config: &ScanConfig) -> anyhow::Result<ManifestCatalog> {
    anyhow::bail!("built without the tree-sitter feature; pass --catalog with a type manifest")
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Discover config if not specified
    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => match discover_config() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Run 'compscan init' to create a config file");
                return Ok(EXIT_ERROR);
            }
        },
    };

    // Parse config
    let mut config = match ScanConfig::parse_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Some(policy) = args.duplicates {
        config.duplicates = policy;
    }

    // Validate config
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let _span = tracing::info_span!("scan", path = %abs_path.display()).entered();

    let catalog = load_catalog(args, &abs_path, &config)?;
    if let Some(dump) = &args.dump_catalog {
        std::fs::write(dump, catalog.to_yaml_string()?)?;
        tracing::info!("wrote {} types to {}", catalog.len(), dump.display());
    }

    let scoped = ScopedCatalog::new(&catalog)
        .with_packages(config.packages.iter())
        .with_exclusions(config.exclude.iter())?;
    let types_scanned = scoped.type_names().len();

    let mut registry = ComponentRegistry::new(config.container_name());
    if let Some(description) = &config.description {
        registry = registry.with_description(description.as_str());
    }
    if let Some(technology) = &config.technology {
        registry = registry.with_technology(technology.as_str());
    }

    let discovery = config.discovery()?;
    if let Err(e) = discovery.run(&mut registry, &scoped) {
        eprintln!("Error: component discovery failed: {}", e);
        return Ok(if e.is_configuration() {
            EXIT_ERROR
        } else {
            EXIT_FAILED
        });
    }

    // Output results
    let config_path_str = config_path.to_string_lossy().to_string();
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => {
            report::write_json(&path_str, &config_path_str, types_scanned, &registry)?;
        }
        _ => {
            report::write_pretty(&path_str, &config_path_str, types_scanned, &registry);
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'compscan init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to describe your components", args.output.display());
    println!("  2. Run: compscan scan src/main/java --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "minimal" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  compscan init --template <name>");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid_configs() {
        for template in TEMPLATES {
            let config = ScanConfig::from_yaml_str(template.content)
                .unwrap_or_else(|e| panic!("template {} does not parse: {}", template.name, e));
            config::validate(&config)
                .unwrap_or_else(|e| panic!("template {} is invalid: {}", template.name, e));
        }
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("compscan.yaml");
        std::fs::write(&output, "keep me").unwrap();

        let args = InitArgs {
            output: output.clone(),
            template: "spring".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
    }

    #[test]
    fn test_init_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("conf/compscan.yaml");

        let args = InitArgs {
            output: output.clone(),
            template: "spring".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let config = ScanConfig::parse_file(&output).unwrap();
        assert_eq!(config.container_name(), "Spring Application");
    }

    #[test]
    fn test_unknown_template() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            output: dir.path().join("compscan.yaml"),
            template: "rails".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
