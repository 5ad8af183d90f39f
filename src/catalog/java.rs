//! Java source catalog built with tree-sitter.
//!
//! Types are read straight from `.java` files without compiling them. Names
//! are resolved in two passes: the first parses every file in parallel and
//! records names as written, the second resolves them against everything
//! that was declared. Resolution order is enclosing types, single-type
//! imports, the same package, then on-demand (`.*`) imports.
//!
//! Unresolved tags and supertypes are kept as written so short-name matching
//! still works. Unresolved references are dropped.

use std::collections::BTreeSet;
use std::path::PathBuf;

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};
use walkdir::WalkDir;

use super::{package_of, simple_name, ManifestCatalog, TypeCategory, TypeInfo, Visibility};

/// Tree-sitter query for package declaration.
const PACKAGE_QUERY: &str = r#"
(package_declaration
  [(scoped_identifier) (identifier)] @package_name
)
"#;

/// Tree-sitter query for extracting imports.
const IMPORT_QUERY: &str = r#"
(import_declaration
  [(scoped_identifier) (identifier)] @import_path
) @import
"#;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

static JAVA: Lazy<Language> = Lazy::new(|| tree_sitter_java::LANGUAGE.into());

/// Build output directories, skipped at the root or next to a build file.
const OUTPUT_DIRS: &[&str] = &["target", "build", "out", "node_modules"];

/// Files that mark a directory as a project root.
const BUILD_FILES: &[&str] = &["pom.xml", "build.gradle", "build.gradle.kts", "package.json"];

/// Builds a [`ManifestCatalog`] from a tree of Java sources.
#[derive(Debug, Clone)]
pub struct JavaCatalogBuilder {
    root: PathBuf,
    excluded_paths: Vec<String>,
}

impl JavaCatalogBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_paths: Vec::new(),
        }
    }

    /// Glob patterns (relative to the root) for files to skip.
    pub fn excluded_paths<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Parse every Java file under the root.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    pub fn build(&self) -> anyhow::Result<ManifestCatalog> {
        let files = self.collect_files()?;
        tracing::info!("parsing {} Java files under {}", files.len(), self.root.display());

        let results: Vec<_> = files
            .par_iter()
            .map(|path| -> anyhow::Result<SourceUnit> {
                let source = std::fs::read(path)
                    .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
                parse_source(&path.to_string_lossy(), &source)
            })
            .collect();

        let mut units = Vec::new();
        for result in results {
            match result {
                Ok(unit) => units.push(unit),
                Err(e) => tracing::warn!("skipping Java source: {}", e),
            }
        }

        // Sort by path for deterministic resolution of duplicate declarations
        units.sort_by(|a, b| a.path.cmp(&b.path));

        let catalog = resolve_units(&units);
        tracing::debug!("catalog holds {} types", catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from in-memory sources, given as `(label, source)`.
    pub fn from_sources<'a, I>(sources: I) -> anyhow::Result<ManifestCatalog>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let units = sources
            .into_iter()
            .map(|(label, source)| parse_source(label, source.as_bytes()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(resolve_units(&units))
    }

    fn excluded_set(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    fn collect_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let excluded = self.excluded_set()?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_skipped_dir(e))
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("java")
            {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if excluded.is_match(relative) {
                tracing::debug!("excluded {}", relative.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }
}

/// Hidden directories, `src/test`, and build output at a project root.
///
/// Java packages may use any of these names, so a directory is only
/// skipped where the build layout puts it.
fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    let Some(parent) = entry.path().parent() else {
        return false;
    };
    if name == "test" {
        return parent.file_name().is_some_and(|p| p == "src");
    }
    OUTPUT_DIRS.contains(&&*name)
        && (entry.depth() == 1 || BUILD_FILES.iter().any(|f| parent.join(f).is_file()))
}

/// Names as written in one file, before resolution.
#[derive(Debug, Default)]
struct SourceUnit {
    path: String,
    package: String,
    imports: Vec<String>,
    on_demand: Vec<String>,
    types: Vec<DeclaredType>,
}

#[derive(Debug)]
struct DeclaredType {
    name: String,
    category: TypeCategory,
    visibility: Visibility,
    nested: bool,
    annotations: Vec<String>,
    supertypes: Vec<String>,
    references: BTreeSet<String>,
}

fn parse_source(path: &str, source: &[u8]) -> anyhow::Result<SourceUnit> {
    let language: &Language = &JAVA;
    let mut parser = Parser::new();
    parser.set_language(language)?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse Java source: {}", path))?;

    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!("{} has syntax errors, reading what parsed", path);
    }

    let package = extract_package(language, root, source)?.unwrap_or_default();
    let (imports, on_demand) = extract_imports(language, root, source)?;

    let mut types = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if TYPE_DECLARATIONS.contains(&child.kind()) {
            read_type(child, source, &package, None, false, &mut types);
        }
    }

    Ok(SourceUnit {
        path: path.to_string(),
        package,
        imports,
        on_demand,
        types,
    })
}

fn node_text<'s>(node: Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Node text with whitespace removed (`java.util . List` is legal Java).
fn compact(node: Node, source: &[u8]) -> String {
    node_text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn extract_package(language: &Language, root: Node, source: &[u8]) -> anyhow::Result<Option<String>> {
    let query = Query::new(language, PACKAGE_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source);

    if let Some(m) = matches.next() {
        for capture in m.captures {
            if query.capture_names()[capture.index as usize] == "package_name" {
                return Ok(Some(compact(capture.node, source)));
            }
        }
    }
    Ok(None)
}

/// Single-type imports and on-demand import prefixes. Static imports are
/// ignored since they name members, not types.
fn extract_imports(
    language: &Language,
    root: Node,
    source: &[u8],
) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    let query = Query::new(language, IMPORT_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source);

    let mut imports = Vec::new();
    let mut on_demand = Vec::new();

    while let Some(m) = matches.next() {
        let mut path = String::new();
        let mut import_node = None;

        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "import_path" => path = compact(capture.node, source),
                "import" => import_node = Some(capture.node),
                _ => {}
            }
        }

        let Some(node) = import_node else {
            continue;
        };
        let mut is_static = false;
        let mut is_wildcard = false;
        let mut walker = node.walk();
        for child in node.children(&mut walker) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => is_wildcard = true,
                _ => {}
            }
        }

        if is_static || path.is_empty() {
            continue;
        }
        let bucket = if is_wildcard { &mut on_demand } else { &mut imports };
        if !bucket.contains(&path) {
            bucket.push(path);
        }
    }

    Ok((imports, on_demand))
}

fn category_of(kind: &str) -> TypeCategory {
    match kind {
        "interface_declaration" => TypeCategory::Interface,
        "enum_declaration" => TypeCategory::Enum,
        "annotation_type_declaration" => TypeCategory::Annotation,
        _ => TypeCategory::Class,
    }
}

/// Record one type declaration and, recursively, the types nested in it.
fn read_type(
    node: Node,
    source: &[u8],
    package: &str,
    enclosing: Option<&str>,
    in_interface: bool,
    out: &mut Vec<DeclaredType>,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let simple = node_text(name_node, source);
    let name = match enclosing {
        Some(outer) => format!("{}.{}", outer, simple),
        None => qualify(package, simple),
    };

    // Members of interfaces are implicitly public.
    let mut declared = DeclaredType {
        name: name.clone(),
        category: category_of(node.kind()),
        visibility: if in_interface {
            Visibility::Public
        } else {
            Visibility::Package
        },
        nested: enclosing.is_some(),
        annotations: Vec::new(),
        supertypes: Vec::new(),
        references: BTreeSet::new(),
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "modifiers" => read_modifiers(child, source, &mut declared),
            "superclass" | "super_interfaces" | "extends_interfaces" => {
                collect_supertypes(child, source, &mut declared.supertypes)
            }
            _ => {}
        }
    }

    let mut nested = Vec::new();
    collect_references(node, source, &mut declared.references, &mut nested);

    let member_of_interface = declared.category.is_interface_like();
    out.push(declared);

    for inner in nested {
        read_type(inner, source, package, Some(&name), member_of_interface, out);
    }
}

fn read_modifiers(modifiers: Node, source: &[u8], declared: &mut DeclaredType) {
    let mut cursor = modifiers.walk();
    for child in modifiers.children(&mut cursor) {
        match child.kind() {
            "public" => declared.visibility = Visibility::Public,
            "protected" => declared.visibility = Visibility::Protected,
            "private" => declared.visibility = Visibility::Private,
            "abstract" if declared.category == TypeCategory::Class => {
                declared.category = TypeCategory::AbstractClass
            }
            "marker_annotation" | "annotation" => {
                if let Some(name) = child.child_by_field_name("name") {
                    declared.annotations.push(compact(name, source));
                }
            }
            _ => {}
        }
    }
}

/// Type name without type arguments.
fn raw_type_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "type_identifier" | "scoped_type_identifier" => Some(compact(node, source)),
        "generic_type" => node.named_child(0).and_then(|base| raw_type_name(base, source)),
        _ => None,
    }
}

fn collect_supertypes(clause: Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut inner = child.walk();
            out.extend(
                child
                    .named_children(&mut inner)
                    .filter_map(|ty| raw_type_name(ty, source)),
            );
        } else if let Some(name) = raw_type_name(child, source) {
            out.push(name);
        }
    }
}

/// True for `X` in `X.call()` and `X.FIELD`, where `X` may name a type.
fn is_access_target(node: Node) -> bool {
    node.parent()
        .filter(|parent| matches!(parent.kind(), "method_invocation" | "field_access"))
        .and_then(|parent| parent.child_by_field_name("object"))
        .map(|object| object.id() == node.id())
        .unwrap_or(false)
}

/// Gather type names used anywhere in a declaration, stopping at nested
/// type declarations (returned in `nested`).
fn collect_references<'t>(
    declaration: Node<'t>,
    source: &[u8],
    references: &mut BTreeSet<String>,
    nested: &mut Vec<Node<'t>>,
) {
    let mut pending = vec![declaration];

    while let Some(node) = pending.pop() {
        if node.id() != declaration.id() && TYPE_DECLARATIONS.contains(&node.kind()) {
            nested.push(node);
            continue;
        }

        match node.kind() {
            "type_identifier" | "scoped_type_identifier" => {
                references.insert(compact(node, source));
                continue;
            }
            "identifier" if is_access_target(node) => {
                references.insert(node_text(node, source).to_string());
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            pending.push(child);
        }
    }

    nested.sort_by_key(|n| n.start_byte());
}

/// Name resolution context for one file.
struct FileScope<'a> {
    unit: &'a SourceUnit,
    declared: BTreeSet<&'a str>,
    known: &'a BTreeSet<String>,
}

impl<'a> FileScope<'a> {
    fn new(unit: &'a SourceUnit, known: &'a BTreeSet<String>) -> Self {
        Self {
            unit,
            declared: unit.types.iter().map(|t| t.name.as_str()).collect(),
            known,
        }
    }

    /// Resolve a name as written inside the declaration of `scope`.
    fn resolve(&self, written: &str, scope: &str) -> Option<String> {
        match written.split_once('.') {
            Some((head, rest)) => match self.resolve_simple(head, scope) {
                Some(outer) => Some(format!("{}.{}", outer, rest)),
                // Already fully qualified
                None => Some(written.to_string()),
            },
            None => self.resolve_simple(written, scope),
        }
    }

    fn resolve_simple(&self, name: &str, scope: &str) -> Option<String> {
        let mut enclosing = Some(scope);
        while let Some(outer) = enclosing {
            if simple_name(outer) == name {
                return Some(outer.to_string());
            }
            let member = format!("{}.{}", outer, name);
            if self.declared.contains(member.as_str()) {
                return Some(member);
            }
            let parent = package_of(outer);
            enclosing = self.declared.contains(parent).then_some(parent);
        }

        if let Some(import) = self.unit.imports.iter().find(|i| simple_name(i) == name) {
            return Some(import.clone());
        }

        let local = qualify(&self.unit.package, name);
        if self.known.contains(&local) {
            return Some(local);
        }

        self.unit
            .on_demand
            .iter()
            .map(|prefix| format!("{}.{}", prefix, name))
            .find(|candidate| self.known.contains(candidate))
    }
}

fn resolve_units(units: &[SourceUnit]) -> ManifestCatalog {
    let known: BTreeSet<String> = units
        .iter()
        .flat_map(|unit| unit.types.iter().map(|t| t.name.clone()))
        .collect();

    let mut catalog = ManifestCatalog::new();
    for unit in units {
        let scope = FileScope::new(unit, &known);

        for declared in &unit.types {
            if catalog.contains(&declared.name) {
                tracing::warn!("{} declared again in {}, keeping the first", declared.name, unit.path);
                continue;
            }

            let mut info = TypeInfo::new(declared.name.as_str())
                .with_package(unit.package.as_str())
                .with_category(declared.category)
                .with_visibility(declared.visibility)
                .nested(declared.nested);

            for annotation in &declared.annotations {
                let tag = scope
                    .resolve(annotation, &declared.name)
                    .unwrap_or_else(|| annotation.clone());
                info.tags.insert(tag);
            }
            for supertype in &declared.supertypes {
                let resolved = scope
                    .resolve(supertype, &declared.name)
                    .unwrap_or_else(|| supertype.clone());
                if !info.supertypes.contains(&resolved) {
                    info.supertypes.push(resolved);
                }
            }
            for written in &declared.references {
                match scope.resolve(written, &declared.name) {
                    Some(resolved) if resolved != declared.name && known.contains(&resolved) => {
                        info.references.insert(resolved);
                    }
                    _ => {}
                }
            }

            catalog.insert(info);
        }
    }
    catalog
}
