//! Go language definition (go modules)

use super::{BuildTemplate, Language, LanguageDefinition};

pub struct GoLanguage;

impl LanguageDefinition for GoLanguage {
    fn id(&self) -> Language {
        Language::Go
    }

    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn build_template(&self) -> BuildTemplate {
        BuildTemplate {
            build_image: "golang:1.21-alpine".to_string(),
            runtime_image: Some("alpine:3.19".to_string()),
            manifest_files: vec!["go.mod".to_string(), "go.sum".to_string()],
            install_commands: vec!["go mod download".to_string()],
            build_commands: vec!["CGO_ENABLED=0 go build -o /app/server .".to_string()],
            artifacts: vec!["/app/server".to_string()],
            port: 8080,
        }
    }

    fn default_run_command(&self, _files: &[&str], _project_name: &str) -> Vec<String> {
        vec!["/app/server".to_string()]
    }
}
