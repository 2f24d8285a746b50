//! JavaScript language definition (npm)

use super::{BuildTemplate, Language, LanguageDefinition};

pub struct JavaScriptLanguage;

pub(super) fn node_template() -> BuildTemplate {
    BuildTemplate {
        build_image: "node:20-slim".to_string(),
        runtime_image: None,
        manifest_files: vec!["package.json".to_string(), "package-lock.json".to_string()],
        install_commands: vec!["npm install".to_string()],
        build_commands: vec![],
        artifacts: vec![],
        port: 3000,
    }
}

pub(super) fn node_run_command(files: &[&str], entry_candidates: &[&str]) -> Vec<String> {
    if files.contains(&"package.json") {
        return vec!["npm".to_string(), "start".to_string()];
    }
    let entry = entry_candidates
        .iter()
        .find(|c| files.contains(c))
        .copied()
        .unwrap_or(entry_candidates[0]);
    vec!["node".to_string(), entry.to_string()]
}

impl LanguageDefinition for JavaScriptLanguage {
    fn id(&self) -> Language {
        Language::JavaScript
    }

    fn extensions(&self) -> &[&str] {
        &["js", "mjs", "cjs", "jsx"]
    }

    fn build_template(&self) -> BuildTemplate {
        node_template()
    }

    fn default_run_command(&self, files: &[&str], _project_name: &str) -> Vec<String> {
        node_run_command(
            files,
            &["index.js", "server.js", "app.js", "main.js", "src/index.js"],
        )
    }
}
