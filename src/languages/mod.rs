//! Language identification and per-language container build knowledge

mod detect;
mod go;
mod javascript;
mod python;
mod registry;
mod rust;
mod typescript;

pub use detect::{detect_language, detect_language_from_path};
pub use go::GoLanguage;
pub use javascript::JavaScriptLanguage;
pub use python::PythonLanguage;
pub use registry::LanguageRegistry;
pub use rust::RustLanguage;
pub use typescript::TypeScriptLanguage;

use crate::ecosystem::Ecosystem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Programming language of a single source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Java,
    Kotlin,
    Ruby,
    Php,
    C,
    Cpp,
    Swift,
    Shell,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Swift => "swift",
            Language::Shell => "shell",
            Language::Unknown => "unknown",
        }
    }

    /// Ecosystem that imports in this language resolve against
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Language::Python => Ecosystem::Pip,
            Language::JavaScript | Language::TypeScript => Ecosystem::Npm,
            Language::Go => Ecosystem::GoModules,
            Language::Rust => Ecosystem::Cargo,
            _ => Ecosystem::Unknown,
        }
    }

    pub fn is_source(&self) -> bool {
        *self != Language::Unknown
    }

    /// Parse a language name as used by hosting platforms (`python3`, `nodejs`, ...)
    pub fn from_platform_name(name: &str) -> Option<Language> {
        let lower = name.trim().to_lowercase();
        let base = lower
            .split(|c: char| c == '-' || c == '_' || c == '@' || c.is_ascii_digit())
            .next()
            .unwrap_or("");
        match base {
            "python" | "py" | "pyright" => Some(Language::Python),
            "node" | "nodejs" | "javascript" | "js" | "bun" => Some(Language::JavaScript),
            "typescript" | "ts" | "deno" => Some(Language::TypeScript),
            "go" | "golang" => Some(Language::Go),
            "rust" | "cargo" => Some(Language::Rust),
            "java" => Some(Language::Java),
            "kotlin" => Some(Language::Kotlin),
            "ruby" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "c" | "clang" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "swift" => Some(Language::Swift),
            "bash" | "sh" | "shell" => Some(Language::Shell),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container build template for a language
#[derive(Debug, Clone)]
pub struct BuildTemplate {
    pub build_image: String,
    /// When set the Dockerfile is multi-stage and only `artifacts` reach this image
    pub runtime_image: Option<String>,
    /// Manifests copied before dependency installation, if present in the tree
    pub manifest_files: Vec<String>,
    pub install_commands: Vec<String>,
    pub build_commands: Vec<String>,
    pub artifacts: Vec<String>,
    pub port: u16,
}

/// Trait defining a language's packaging characteristics
pub trait LanguageDefinition: Send + Sync {
    fn id(&self) -> Language;

    /// File extensions associated with this language
    fn extensions(&self) -> &[&str];

    fn ecosystem(&self) -> Ecosystem {
        self.id().ecosystem()
    }

    fn build_template(&self) -> BuildTemplate;

    /// Command used when the source platform did not declare one
    fn default_run_command(&self, files: &[&str], project_name: &str) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_ecosystem() {
        assert_eq!(Language::Python.ecosystem(), Ecosystem::Pip);
        assert_eq!(Language::TypeScript.ecosystem(), Ecosystem::Npm);
        assert_eq!(Language::Go.ecosystem(), Ecosystem::GoModules);
        assert_eq!(Language::Rust.ecosystem(), Ecosystem::Cargo);
        assert_eq!(Language::Ruby.ecosystem(), Ecosystem::Unknown);
    }

    #[test]
    fn test_from_platform_name() {
        assert_eq!(Language::from_platform_name("python3"), Some(Language::Python));
        assert_eq!(Language::from_platform_name("python-3.11"), Some(Language::Python));
        assert_eq!(Language::from_platform_name("nodejs-20"), Some(Language::JavaScript));
        assert_eq!(Language::from_platform_name("go-1.21"), Some(Language::Go));
        assert_eq!(Language::from_platform_name("web"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::JavaScript).unwrap(), "\"javascript\"");
        assert_eq!(serde_json::to_string(&Language::Cpp).unwrap(), "\"cpp\"");
    }
}
