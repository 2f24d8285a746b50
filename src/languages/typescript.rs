//! TypeScript language definition (npm)

use super::javascript::{node_run_command, node_template};
use super::{BuildTemplate, Language, LanguageDefinition};

pub struct TypeScriptLanguage;

impl LanguageDefinition for TypeScriptLanguage {
    fn id(&self) -> Language {
        Language::TypeScript
    }

    fn extensions(&self) -> &[&str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn build_template(&self) -> BuildTemplate {
        BuildTemplate {
            build_commands: vec!["npm run build --if-present".to_string()],
            ..node_template()
        }
    }

    fn default_run_command(&self, files: &[&str], _project_name: &str) -> Vec<String> {
        let mut command = node_run_command(files, &["dist/index.js", "index.ts", "src/index.ts"]);
        if command[0] == "node" && command[1].ends_with(".ts") {
            command.insert(0, "npx".to_string());
            command[1] = "tsx".to_string();
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_step_added() {
        let template = TypeScriptLanguage.build_template();
        assert_eq!(template.build_image, "node:20-slim");
        assert_eq!(template.build_commands, vec!["npm run build --if-present"]);
    }

    #[test]
    fn test_bare_ts_entry_runs_through_tsx() {
        let files = ["src/index.ts"];
        assert_eq!(
            TypeScriptLanguage.default_run_command(&files, "svc"),
            vec!["npx", "tsx", "src/index.ts"]
        );
    }
}
