//! Normalized per-ecosystem manifests

use crate::dependencies::{Dependency, MergedDependencies};
use crate::ecosystem::Ecosystem;
use crate::error::{LiberatorError, Result};
use crate::extraction::ExtractionResult;
use serde_json::{Map, Value};
use tracing::debug;

const NPM_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];
const CARGO_SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];
const PIP_OPERATORS: &[&str] = &["===", "==", "!=", ">=", "<=", "~=", ">", "<"];
const DEFAULT_GO_DIRECTIVE: &str = "1.21";

fn serialization(what: &str, reason: impl ToString) -> LiberatorError {
    LiberatorError::Serialization {
        what: what.to_string(),
        reason: reason.to_string(),
    }
}

/// Package name usable by npm and cargo: lowercase, `[a-z0-9_-]`
pub fn package_name(project_name: &str) -> String {
    let mut name: String = project_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    name = name.trim_matches('-').to_string();
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name = format!("app-{}", name).trim_end_matches('-').to_string();
    }
    name
}

/// File name and content of the normalized manifest for `ecosystem`, or
/// `None` when the ecosystem has no dependencies.
pub fn render_manifest(
    ecosystem: Ecosystem,
    result: &ExtractionResult,
    deps: &MergedDependencies,
) -> Result<Option<(&'static str, String)>> {
    let list = deps.get(ecosystem);
    if list.is_empty() {
        return Ok(None);
    }
    let source = result.root_manifest(ecosystem).map(|m| m.content.as_str());

    let rendered = match ecosystem {
        Ecosystem::Npm => ("package.json", render_package_json(&result.project_name, source, list)?),
        Ecosystem::Pip => ("requirements.txt", render_requirements(list)),
        Ecosystem::GoModules => ("go.mod", render_go_mod(&result.project_name, source, deps)),
        Ecosystem::Cargo => ("Cargo.toml", render_cargo_toml(&result.project_name, source, list)?),
        Ecosystem::Unknown => return Ok(None),
    };
    debug!(ecosystem = %ecosystem, file = rendered.0, dependencies = list.len(), "Rendered manifest");
    Ok(Some(rendered))
}

/// Whether the generated manifest can be merged into this source copy;
/// `package.json` and `Cargo.toml` are rewritten from their parsed form
pub fn merges_into_source(file_name: &str, content: &[u8]) -> bool {
    let text = std::str::from_utf8(content);
    match file_name {
        "package.json" => text
            .ok()
            .and_then(|t| serde_json::from_str::<Value>(t).ok())
            .is_some_and(|v| v.is_object()),
        "Cargo.toml" => text
            .ok()
            .is_some_and(|t| toml::from_str::<toml::Table>(t).is_ok()),
        _ => true,
    }
}

pub fn render_package_json(
    project_name: &str,
    source: Option<&str>,
    deps: &[Dependency],
) -> Result<String> {
    let mut root = source
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_else(|| {
            let mut map = Map::new();
            map.insert("name".to_string(), Value::from(package_name(project_name)));
            map.insert("version".to_string(), Value::from("1.0.0"));
            map.insert("private".to_string(), Value::Bool(true));
            map
        });

    for dep in deps {
        let version = Value::from(dep.version.clone().unwrap_or_else(|| "*".to_string()));
        let existing = NPM_SECTIONS.iter().find(|section| {
            root.get(**section)
                .and_then(Value::as_object)
                .is_some_and(|s| s.contains_key(&dep.name))
        });

        match existing {
            Some(section) => {
                if dep.version.is_some() {
                    if let Some(Value::Object(s)) = root.get_mut(*section) {
                        s.insert(dep.name.clone(), version);
                    }
                }
            }
            None => {
                let section = root
                    .entry("dependencies")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !section.is_object() {
                    *section = Value::Object(Map::new());
                }
                if let Value::Object(s) = section {
                    s.insert(dep.name.clone(), version);
                }
            }
        }
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .map_err(|e| serialization("package.json", e))?;
    out.push('\n');
    Ok(out)
}

/// One `requirements.txt` line; bare, caret and tilde versions become pip operators
pub fn requirement_line(dep: &Dependency) -> String {
    let Some(version) = dep.version.as_deref().map(str::trim) else {
        return dep.name.clone();
    };
    if version.is_empty() || version == "*" {
        return dep.name.clone();
    }
    if PIP_OPERATORS.iter().any(|op| version.starts_with(op)) {
        return format!("{}{}", dep.name, version);
    }
    if let Some(rest) = version.strip_prefix('^') {
        return bounded_requirement(&dep.name, rest.trim(), caret_bump_index);
    }
    if let Some(rest) = version.strip_prefix('~') {
        return bounded_requirement(&dep.name, rest.trim(), tilde_bump_index);
    }
    if version.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("{}=={}", dep.name, version);
    }
    dep.name.clone()
}

/// Caret bumps the first non-zero component, or the last one when all are zero
fn caret_bump_index(parts: &[u64]) -> usize {
    parts
        .iter()
        .position(|&p| p != 0)
        .unwrap_or(parts.len() - 1)
}

/// Tilde bumps the minor component, or the major when only that is given
fn tilde_bump_index(parts: &[u64]) -> usize {
    if parts.len() == 1 {
        0
    } else {
        1
    }
}

/// `>=lower,<upper` for a Poetry caret or tilde constraint
fn bounded_requirement(name: &str, lower: &str, bump_index: fn(&[u64]) -> usize) -> String {
    let parts: Option<Vec<u64>> = lower.split('.').map(|p| p.parse().ok()).collect();
    let Some(parts) = parts.filter(|p| !p.is_empty()) else {
        return format!("{}>={}", name, lower);
    };

    let bump = bump_index(&parts);
    let upper: Vec<String> = parts
        .iter()
        .enumerate()
        .map(|(i, &p)| match i.cmp(&bump) {
            std::cmp::Ordering::Less => p.to_string(),
            std::cmp::Ordering::Equal => (p + 1).to_string(),
            std::cmp::Ordering::Greater => "0".to_string(),
        })
        .collect();
    format!("{}>={},<{}", name, lower, upper.join("."))
}

pub fn render_requirements(deps: &[Dependency]) -> String {
    let mut out = String::new();
    for dep in deps {
        out.push_str(&requirement_line(dep));
        out.push('\n');
    }
    out
}

fn go_directive<'a>(source: Option<&'a str>, directive: &str) -> Option<&'a str> {
    source?.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        (parts.next() == Some(directive)).then(|| parts.next()).flatten()
    })
}

pub fn render_go_mod(project_name: &str, source: Option<&str>, deps: &MergedDependencies) -> String {
    let module = go_directive(source, "module")
        .map(|m| m.trim_matches('"').to_string())
        .unwrap_or_else(|| package_name(project_name));
    let go = go_directive(source, "go").unwrap_or(DEFAULT_GO_DIRECTIVE);

    let mut out = format!("module {}\n\ngo {}\n", module, go);
    let sorted = deps.sorted_by_name(Ecosystem::GoModules);
    if !sorted.is_empty() {
        out.push_str("\nrequire (\n");
        for dep in sorted {
            out.push_str(&format!(
                "\t{} {}\n",
                dep.name,
                dep.version.as_deref().unwrap_or("v0.0.0")
            ));
        }
        out.push_str(")\n");
    }
    out
}

fn cargo_key(name: &str) -> String {
    name.replace('-', "_")
}

pub fn render_cargo_toml(
    project_name: &str,
    source: Option<&str>,
    deps: &[Dependency],
) -> Result<String> {
    let mut doc = source
        .and_then(|s| toml::from_str::<toml::Table>(s).ok())
        .unwrap_or_else(|| {
            let mut package = toml::Table::new();
            package.insert("name".into(), toml::Value::from(package_name(project_name)));
            package.insert("version".into(), toml::Value::from("0.1.0"));
            package.insert("edition".into(), toml::Value::from("2021"));
            let mut doc = toml::Table::new();
            doc.insert("package".into(), toml::Value::Table(package));
            doc
        });

    let present: Vec<String> = CARGO_SECTIONS
        .iter()
        .filter_map(|s| doc.get(*s).and_then(toml::Value::as_table))
        .flat_map(|t| t.keys().map(|k| cargo_key(k)))
        .collect();

    let missing: Vec<&Dependency> = deps
        .iter()
        .filter(|d| !present.contains(&cargo_key(&d.name)))
        .collect();

    if !missing.is_empty() {
        let section = doc
            .entry("dependencies")
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if !section.is_table() {
            *section = toml::Value::Table(toml::Table::new());
        }
        if let toml::Value::Table(table) = section {
            for dep in missing {
                let version = dep.version.clone().unwrap_or_else(|| "*".to_string());
                table.insert(dep.name.clone(), toml::Value::from(version));
            }
        }
    }

    toml::to_string(&doc).map_err(|e| serialization("Cargo.toml", e))
}
