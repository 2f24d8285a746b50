//! Package-manager ecosystems used to partition dependency identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ecosystem {
    Npm,
    Pip,
    GoModules,
    Cargo,
    Unknown,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::Npm,
        Ecosystem::Pip,
        Ecosystem::GoModules,
        Ecosystem::Cargo,
        Ecosystem::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pip => "pip",
            Ecosystem::GoModules => "go-modules",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Unknown => "unknown",
        }
    }

    /// Human-facing toolchain name used in generated docs
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "Node.js",
            Ecosystem::Pip => "Python",
            Ecosystem::GoModules => "Go",
            Ecosystem::Cargo => "Rust",
            Ecosystem::Unknown => "Other",
        }
    }

    /// File name of the normalized manifest written for this ecosystem
    pub fn manifest_file(&self) -> Option<&'static str> {
        match self {
            Ecosystem::Npm => Some("package.json"),
            Ecosystem::Pip => Some("requirements.txt"),
            Ecosystem::GoModules => Some("go.mod"),
            Ecosystem::Cargo => Some("Cargo.toml"),
            Ecosystem::Unknown => None,
        }
    }

    /// Canonical form of a package name used as the merge key.
    ///
    /// pip names compare case-insensitively with `-`, `_` and `.` equivalent
    /// (PEP 503); cargo treats `-` and `_` as the same crate.
    pub fn normalize_name(&self, name: &str) -> String {
        match self {
            Ecosystem::Pip => {
                let mut out = String::with_capacity(name.len());
                let mut last_sep = false;
                for c in name.trim().chars() {
                    if matches!(c, '-' | '_' | '.') {
                        if !last_sep {
                            out.push('-');
                        }
                        last_sep = true;
                    } else {
                        out.push(c.to_ascii_lowercase());
                        last_sep = false;
                    }
                }
                out
            }
            Ecosystem::Cargo => name.trim().replace('-', "_"),
            _ => name.trim().to_string(),
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(Ecosystem::Npm),
            "pip" => Ok(Ecosystem::Pip),
            "go-modules" | "go" => Ok(Ecosystem::GoModules),
            "cargo" => Ok(Ecosystem::Cargo),
            "unknown" => Ok(Ecosystem::Unknown),
            other => Err(format!("Unknown ecosystem: {}", other)),
        }
    }
}
