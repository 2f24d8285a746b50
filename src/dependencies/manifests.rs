//! Parsers for ecosystem manifest files

use crate::ecosystem::Ecosystem;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use toml::Value as TomlValue;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Malformed manifest: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub name: String,
    pub version: Option<String>,
}

impl DeclaredDependency {
    fn new(name: &str, version: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

/// What a manifest declares: external dependencies in file order, and names
/// that belong to the project itself (package name, go module path).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestContents {
    pub dependencies: Vec<DeclaredDependency>,
    pub local_names: Vec<String>,
}

pub trait ManifestParser: Send + Sync {
    fn supports_file(&self, file_name: &str) -> bool;

    fn ecosystem(&self) -> Ecosystem;

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError>;
}

fn is_requirements_file(file_name: &str) -> bool {
    file_name.starts_with("requirements") && file_name.ends_with(".txt")
}

/// Ecosystem whose manifest format `file_name` is
pub fn ecosystem_for_manifest(file_name: &str) -> Option<Ecosystem> {
    match file_name {
        "package.json" => Some(Ecosystem::Npm),
        "pyproject.toml" | "Pipfile" => Some(Ecosystem::Pip),
        "go.mod" => Some(Ecosystem::GoModules),
        "Cargo.toml" => Some(Ecosystem::Cargo),
        name if is_requirements_file(name) => Some(Ecosystem::Pip),
        _ => None,
    }
}

pub struct PackageJsonParser;

const NPM_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

impl ManifestParser for PackageJsonParser {
    fn supports_file(&self, file_name: &str) -> bool {
        file_name == "package.json"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let root: JsonValue = serde_json::from_str(content)?;
        let object = root
            .as_object()
            .ok_or_else(|| ManifestError::Malformed("top level is not an object".to_string()))?;

        let mut contents = ManifestContents::default();
        if let Some(name) = object.get("name").and_then(JsonValue::as_str) {
            contents.local_names.push(name.to_string());
        }

        for section in NPM_SECTIONS {
            let Some(deps) = object.get(*section).and_then(JsonValue::as_object) else {
                continue;
            };
            for (name, spec) in deps {
                let spec = spec.as_str();
                // Local and workspace links are not registry packages
                if spec.is_some_and(|s| {
                    s.starts_with("file:") || s.starts_with("link:") || s.starts_with("workspace:")
                }) {
                    continue;
                }
                contents.dependencies.push(DeclaredDependency::new(name, spec));
            }
        }
        Ok(contents)
    }
}

fn requirement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*(.*)$").expect("valid regex")
    })
}

/// One PEP 508 requirement (`flask[async]==2.0 ; python_version>"3"`)
fn parse_requirement(line: &str) -> Option<DeclaredDependency> {
    let line = line.split(';').next().unwrap_or(line).trim();
    if line.is_empty() {
        return None;
    }

    let caps = requirement_regex().captures(line)?;
    let name = caps.get(1)?.as_str();
    let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    // `name @ https://...` direct references carry no version constraint
    if rest.starts_with('@') {
        return Some(DeclaredDependency::new(name, None));
    }
    let version: String = rest
        .trim_start_matches('(')
        .trim_end_matches(')')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Some(DeclaredDependency::new(name, Some(&version)))
}

pub struct RequirementsTxtParser;

impl ManifestParser for RequirementsTxtParser {
    fn supports_file(&self, file_name: &str) -> bool {
        is_requirements_file(file_name)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let mut contents = ManifestContents::default();
        for raw in content.lines() {
            let line = match raw.find(" #") {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let line = line.trim().trim_end_matches('\\').trim();

            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with('-')
                || line.starts_with("git+")
                || line
                    .split_whitespace()
                    .next()
                    .is_some_and(|token| token.contains("://"))
            {
                continue;
            }
            if let Some(dep) = parse_requirement(line) {
                contents.dependencies.push(dep);
            }
        }
        Ok(contents)
    }
}

/// Poetry/Pipfile style value: `"^1.0"`, `"*"` or `{ version = "..." }`
fn toml_version(value: &TomlValue) -> Option<&str> {
    match value {
        TomlValue::String(s) => Some(s.as_str()),
        TomlValue::Table(t) => t.get("version").and_then(TomlValue::as_str),
        _ => None,
    }
}

fn is_local_toml_dependency(value: &TomlValue) -> bool {
    value
        .as_table()
        .is_some_and(|t| t.contains_key("path") || t.get("workspace").and_then(TomlValue::as_bool) == Some(true))
}

fn push_toml_table(table: Option<&TomlValue>, skip: &[&str], contents: &mut ManifestContents) {
    let Some(table) = table.and_then(TomlValue::as_table) else {
        return;
    };
    for (name, value) in table {
        if skip.contains(&name.as_str()) || is_local_toml_dependency(value) {
            continue;
        }
        contents
            .dependencies
            .push(DeclaredDependency::new(name, toml_version(value)));
    }
}

pub struct PyProjectParser;

impl ManifestParser for PyProjectParser {
    fn supports_file(&self, file_name: &str) -> bool {
        file_name == "pyproject.toml"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let root: TomlValue = toml::from_str(content)?;
        let mut contents = ManifestContents::default();

        let project = root.get("project");
        if let Some(name) = project.and_then(|p| p.get("name")).and_then(TomlValue::as_str) {
            contents.local_names.push(name.to_string());
        }
        if let Some(deps) = project
            .and_then(|p| p.get("dependencies"))
            .and_then(TomlValue::as_array)
        {
            for dep in deps.iter().filter_map(TomlValue::as_str) {
                if let Some(parsed) = parse_requirement(dep) {
                    contents.dependencies.push(parsed);
                }
            }
        }

        let poetry = root.get("tool").and_then(|t| t.get("poetry"));
        if let Some(name) = poetry.and_then(|p| p.get("name")).and_then(TomlValue::as_str) {
            if !contents.local_names.iter().any(|n| n == name) {
                contents.local_names.push(name.to_string());
            }
        }
        push_toml_table(poetry.and_then(|p| p.get("dependencies")), &["python"], &mut contents);
        push_toml_table(poetry.and_then(|p| p.get("dev-dependencies")), &["python"], &mut contents);
        if let Some(groups) = poetry
            .and_then(|p| p.get("group"))
            .and_then(TomlValue::as_table)
        {
            for group in groups.values() {
                push_toml_table(group.get("dependencies"), &["python"], &mut contents);
            }
        }

        Ok(contents)
    }
}

pub struct PipfileParser;

impl ManifestParser for PipfileParser {
    fn supports_file(&self, file_name: &str) -> bool {
        file_name == "Pipfile"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let root: TomlValue = toml::from_str(content)?;
        let mut contents = ManifestContents::default();
        push_toml_table(root.get("packages"), &[], &mut contents);
        push_toml_table(root.get("dev-packages"), &[], &mut contents);
        Ok(contents)
    }
}

pub struct GoModParser;

impl GoModParser {
    fn parse_require_line(line: &str, contents: &mut ManifestContents) {
        let line = line.split("//").next().unwrap_or(line).trim();
        let mut parts = line.split_whitespace();
        if let Some(path) = parts.next() {
            contents
                .dependencies
                .push(DeclaredDependency::new(path, parts.next()));
        }
    }
}

impl ManifestParser for GoModParser {
    fn supports_file(&self, file_name: &str) -> bool {
        file_name == "go.mod"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let mut contents = ManifestContents::default();
        let mut in_require_block = false;
        let mut in_other_block = false;

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if in_require_block {
                if line.starts_with(')') {
                    in_require_block = false;
                } else {
                    Self::parse_require_line(line, &mut contents);
                }
                continue;
            }
            if in_other_block {
                in_other_block = !line.starts_with(')');
                continue;
            }

            if let Some(module) = line.strip_prefix("module ") {
                contents
                    .local_names
                    .push(module.trim().trim_matches('"').to_string());
            } else if let Some(rest) = line.strip_prefix("require") {
                let rest = rest.trim();
                if rest.starts_with('(') {
                    in_require_block = true;
                } else if !rest.is_empty() {
                    Self::parse_require_line(rest, &mut contents);
                }
            } else if line.ends_with('(') {
                in_other_block = true;
            }
        }

        if in_require_block {
            return Err(ManifestError::Malformed(
                "unterminated require block".to_string(),
            ));
        }
        Ok(contents)
    }
}

pub struct CargoTomlParser;

const CARGO_SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

impl ManifestParser for CargoTomlParser {
    fn supports_file(&self, file_name: &str) -> bool {
        file_name == "Cargo.toml"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    fn parse(&self, content: &str) -> Result<ManifestContents, ManifestError> {
        let root: TomlValue = toml::from_str(content)?;
        let mut contents = ManifestContents::default();

        if let Some(name) = root
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(TomlValue::as_str)
        {
            contents.local_names.push(name.to_string());
        }

        for section in CARGO_SECTIONS {
            push_toml_table(root.get(*section), &[], &mut contents);
        }
        if let Some(targets) = root.get("target").and_then(TomlValue::as_table) {
            for target in targets.values() {
                for section in CARGO_SECTIONS {
                    push_toml_table(target.get(*section), &[], &mut contents);
                }
            }
        }
        Ok(contents)
    }
}

/// Ordered set of manifest parsers; the first supporting a file name parses it
#[derive(Clone)]
pub struct ManifestParsers {
    parsers: Vec<Arc<dyn ManifestParser>>,
}

impl ManifestParsers {
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut parsers = Self::new();
        parsers.register(Arc::new(PackageJsonParser));
        parsers.register(Arc::new(RequirementsTxtParser));
        parsers.register(Arc::new(PyProjectParser));
        parsers.register(Arc::new(PipfileParser));
        parsers.register(Arc::new(GoModParser));
        parsers.register(Arc::new(CargoTomlParser));
        parsers
    }

    pub fn register(&mut self, parser: Arc<dyn ManifestParser>) {
        self.parsers.push(parser);
    }

    pub fn parser_for(&self, file_name: &str) -> Option<&dyn ManifestParser> {
        self.parsers
            .iter()
            .find(|p| p.supports_file(file_name))
            .map(|p| p.as_ref())
    }
}

impl Default for ManifestParsers {
    fn default() -> Self {
        Self::with_defaults()
    }
}
