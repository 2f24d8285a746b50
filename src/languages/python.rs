//! Python language definition (pip)

use super::{BuildTemplate, Language, LanguageDefinition};

pub struct PythonLanguage;

const ENTRYPOINT_CANDIDATES: &[&str] = &["main.py", "app.py", "server.py", "run.py", "manage.py"];

impl LanguageDefinition for PythonLanguage {
    fn id(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &[&str] {
        &["py", "pyi", "pyw"]
    }

    fn build_template(&self) -> BuildTemplate {
        BuildTemplate {
            build_image: "python:3.11-slim".to_string(),
            runtime_image: None,
            manifest_files: vec!["requirements.txt".to_string()],
            install_commands: vec!["pip install --no-cache-dir -r requirements.txt".to_string()],
            build_commands: vec![],
            artifacts: vec![],
            port: 8000,
        }
    }

    fn default_run_command(&self, files: &[&str], _project_name: &str) -> Vec<String> {
        let entry = ENTRYPOINT_CANDIDATES
            .iter()
            .find(|c| files.contains(c))
            .map(|c| c.to_string())
            .or_else(|| {
                files
                    .iter()
                    .find(|f| !f.contains('/') && f.ends_with(".py"))
                    .map(|f| f.to_string())
            })
            .unwrap_or_else(|| "main.py".to_string());

        if entry == "manage.py" {
            return vec![
                "python".to_string(),
                entry,
                "runserver".to_string(),
                "0.0.0.0:8000".to_string(),
            ];
        }
        vec!["python".to_string(), entry]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_prefers_known_entrypoints() {
        let files = ["helpers.py", "app.py", "lib/main.py"];
        assert_eq!(
            PythonLanguage.default_run_command(&files, "demo"),
            vec!["python", "app.py"]
        );
    }

    #[test]
    fn test_run_command_falls_back_to_top_level_script() {
        let files = ["bot.py", "pkg/main.py"];
        assert_eq!(
            PythonLanguage.default_run_command(&files, "demo"),
            vec!["python", "bot.py"]
        );
    }

    #[test]
    fn test_django_runserver() {
        let files = ["manage.py", "site/settings.py"];
        assert_eq!(
            PythonLanguage.default_run_command(&files, "demo")[2],
            "runserver"
        );
    }

    #[test]
    fn test_template_installs_requirements() {
        let template = PythonLanguage.build_template();
        assert!(template.runtime_image.is_none());
        assert_eq!(template.manifest_files, vec!["requirements.txt"]);
    }
}
