//! Rust language definition (cargo)

use super::{BuildTemplate, Language, LanguageDefinition};

pub struct RustLanguage;

impl LanguageDefinition for RustLanguage {
    fn id(&self) -> Language {
        Language::Rust
    }

    fn extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn build_template(&self) -> BuildTemplate {
        BuildTemplate {
            build_image: "rust:1.75-slim".to_string(),
            runtime_image: Some("debian:bookworm-slim".to_string()),
            manifest_files: vec!["Cargo.toml".to_string(), "Cargo.lock".to_string()],
            install_commands: vec![],
            build_commands: vec!["cargo install --path . --root /usr/local".to_string()],
            artifacts: vec!["/usr/local/bin".to_string()],
            port: 8080,
        }
    }

    /// Binaries installed by `cargo install` are named after the package
    fn default_run_command(&self, _files: &[&str], project_name: &str) -> Vec<String> {
        vec![project_name.to_string()]
    }
}
