//! Declared and inferred third-party dependencies, merged per ecosystem

pub mod analyzer;
pub mod manifests;

pub use analyzer::{DependencyAnalysis, DependencyAnalyzer};
pub use manifests::{
    ecosystem_for_manifest, DeclaredDependency, ManifestContents, ManifestError, ManifestParser,
    ManifestParsers,
};

use crate::ecosystem::Ecosystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a dependency record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    Declared { manifest: String },
    Inferred { file: String },
}

impl Provenance {
    pub fn is_declared(&self) -> bool {
        matches!(self, Provenance::Declared { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub ecosystem: Ecosystem,
    /// Name as written in the manifest or derived from the import
    pub name: String,
    /// Normalized identity within the ecosystem
    pub key: String,
    /// Requested constraint as written, `None` when unconstrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub provenance: Provenance,
}

impl Dependency {
    pub fn declared(
        ecosystem: Ecosystem,
        name: &str,
        version: Option<String>,
        manifest: &str,
    ) -> Self {
        Self {
            ecosystem,
            name: name.to_string(),
            key: ecosystem.normalize_name(name),
            version,
            provenance: Provenance::Declared {
                manifest: manifest.to_string(),
            },
        }
    }

    pub fn inferred(ecosystem: Ecosystem, name: &str, file: &str) -> Self {
        Self {
            ecosystem,
            name: name.to_string(),
            key: ecosystem.normalize_name(name),
            version: None,
            provenance: Provenance::Inferred {
                file: file.to_string(),
            },
        }
    }

    pub fn specificity(&self) -> Specificity {
        Specificity::of(self.ecosystem, self.version.as_deref())
    }
}

/// How tightly a version constraint pins a package, least to most specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    Unconstrained,
    Wildcard,
    Range,
    Exact,
}

impl Specificity {
    pub fn of(ecosystem: Ecosystem, constraint: Option<&str>) -> Self {
        let Some(raw) = constraint else {
            return Specificity::Unconstrained;
        };
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" || raw.eq_ignore_ascii_case("latest") {
            return Specificity::Wildcard;
        }

        let (explicit_eq, rest) = if let Some(rest) = raw.strip_prefix("===") {
            (true, rest)
        } else if let Some(rest) = raw.strip_prefix("==") {
            (true, rest)
        } else if let Some(rest) = raw.strip_prefix('=') {
            (true, rest)
        } else {
            (false, raw)
        };
        let rest = rest.trim();

        let looks_like_version = rest
            .trim_start_matches('v')
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        let has_range_syntax = rest.chars().any(|c| {
            matches!(c, '^' | '~' | '>' | '<' | ',' | '*' | '|' | ' ' | '!')
        }) || rest.split('.').any(|part| part.eq_ignore_ascii_case("x"));

        if !looks_like_version || has_range_syntax {
            return Specificity::Range;
        }

        // Bare versions are caret requirements in cargo and pip has no bare form
        match ecosystem {
            Ecosystem::Cargo | Ecosystem::Pip if !explicit_eq => Specificity::Range,
            _ => Specificity::Exact,
        }
    }
}

/// Dependencies per ecosystem, each list in first-seen order with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDependencies {
    by_ecosystem: BTreeMap<Ecosystem, Vec<Dependency>>,
}

impl MergedDependencies {
    /// Merge in two passes: declared records first, keeping the most specific
    /// constraint per key, then inferred records for keys not yet present.
    pub fn merge(declared: Vec<Dependency>, inferred: Vec<Dependency>) -> Self {
        let mut index: BTreeMap<(Ecosystem, String), usize> = BTreeMap::new();
        let mut by_ecosystem: BTreeMap<Ecosystem, Vec<Dependency>> = BTreeMap::new();

        for dep in declared {
            let list = by_ecosystem.entry(dep.ecosystem).or_default();
            match index.get(&(dep.ecosystem, dep.key.clone())) {
                Some(&pos) => {
                    if dep.specificity() > list[pos].specificity() {
                        list[pos].version = dep.version;
                        list[pos].provenance = dep.provenance;
                    }
                }
                None => {
                    index.insert((dep.ecosystem, dep.key.clone()), list.len());
                    list.push(dep);
                }
            }
        }

        for dep in inferred {
            let key = (dep.ecosystem, dep.key.clone());
            if index.contains_key(&key) {
                continue;
            }
            let list = by_ecosystem.entry(dep.ecosystem).or_default();
            index.insert(key, list.len());
            list.push(dep);
        }

        by_ecosystem.retain(|_, list| !list.is_empty());
        Self { by_ecosystem }
    }

    pub fn get(&self, ecosystem: Ecosystem) -> &[Dependency] {
        self.by_ecosystem
            .get(&ecosystem)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find(&self, ecosystem: Ecosystem, name: &str) -> Option<&Dependency> {
        let key = ecosystem.normalize_name(name);
        self.get(ecosystem).iter().find(|d| d.key == key)
    }

    /// Non-empty ecosystems in `Ecosystem` order
    pub fn iter(&self) -> impl Iterator<Item = (Ecosystem, &[Dependency])> {
        self.by_ecosystem
            .iter()
            .map(|(eco, deps)| (*eco, deps.as_slice()))
    }

    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        self.by_ecosystem.keys().copied().collect()
    }

    pub fn counts(&self) -> BTreeMap<Ecosystem, usize> {
        self.by_ecosystem
            .iter()
            .map(|(eco, deps)| (*eco, deps.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.by_ecosystem.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ecosystem.is_empty()
    }

    /// One ecosystem's dependencies ordered by name
    pub fn sorted_by_name(&self, ecosystem: Ecosystem) -> Vec<&Dependency> {
        let mut deps: Vec<&Dependency> = self.get(ecosystem).iter().collect();
        deps.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.name.cmp(&b.name)));
        deps
    }
}
