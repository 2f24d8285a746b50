use super::{collect_tree, find_marker, ExtractContext, PlatformExtractor};
use crate::error::Result;
use crate::extraction::{ExtractionResult, Platform, Warning, WarningKind};
use crate::fs::FileSystem;
use crate::languages::Language;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

const MARKERS: &[&str] = &[".replit", "replit.nix", ".config/replit", "replit.json"];

/// Config files in the order they are consulted; `.replit` is TOML in practice
/// but older exports wrote JSON
const CONFIG_FILES: &[&str] = &[".replit", "replit.json"];

fn nix_package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"pkgs\.([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)").expect("valid regex")
    })
}

pub struct ReplitExtractor;

/// Settings read from `.replit`
#[derive(Debug, Default, PartialEq)]
struct ReplitSettings {
    run_command: Option<String>,
    language: Option<String>,
    entrypoint: Option<String>,
    env_keys: Vec<String>,
}

fn parse_config(text: &str) -> std::result::Result<Value, String> {
    match toml::from_str::<toml::Value>(text) {
        Ok(value) => serde_json::to_value(value).map_err(|e| e.to_string()),
        Err(toml_err) => serde_json::from_str::<Value>(text)
            .map_err(|_| format!("Neither TOML nor JSON: {}", toml_err.message())),
    }
}

/// A command given either as a string or as an argument array
fn command_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

fn language_name(raw: &str) -> String {
    Language::from_platform_name(raw)
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_lowercase())
}

impl ReplitSettings {
    fn from_config(config: &Value) -> Self {
        let run_command = config
            .get("run")
            .and_then(command_string)
            .or_else(|| {
                config
                    .get("deployment")
                    .and_then(|d| d.get("run"))
                    .and_then(command_string)
            });

        let language = config
            .get("language")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(language_name)
            .or_else(|| {
                config
                    .get("modules")
                    .and_then(Value::as_array)?
                    .iter()
                    .filter_map(Value::as_str)
                    .find_map(Language::from_platform_name)
                    .map(|l| l.as_str().to_string())
            });

        let entrypoint = config
            .get("entrypoint")
            .and_then(Value::as_str)
            .map(str::to_string);

        let env_keys = config
            .get("env")
            .and_then(Value::as_object)
            .map(|env| env.keys().cloned().collect())
            .unwrap_or_default();

        Self {
            run_command,
            language,
            entrypoint,
            env_keys,
        }
    }
}

/// `pkgs.<name>` references in a `replit.nix`, first-seen order
fn nix_packages(text: &str) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for caps in nix_package_regex().captures_iter(text) {
        let name = caps[1].to_string();
        if !packages.contains(&name) {
            packages.push(name);
        }
    }
    packages
}

impl ReplitExtractor {
    fn apply_config(result: &mut ExtractionResult) {
        let Some((path, text)) = CONFIG_FILES.iter().find_map(|name| {
            let text = result.file(name)?.text()?.to_string();
            Some((*name, text))
        }) else {
            return;
        };

        let config = match parse_config(&text) {
            Ok(config) => config,
            Err(message) => {
                warn!(path, error = %message, "Replit config unparsable");
                result.warn(Warning::for_path(WarningKind::MarkerUnparsable, path, message));
                return;
            }
        };

        let settings = ReplitSettings::from_config(&config);
        debug!(path, ?settings, "Replit config parsed");
        if let Some(run) = settings.run_command {
            result.set_metadata("run_command", run);
        }
        if let Some(language) = settings.language {
            result.set_metadata("language", language);
        }
        if let Some(entrypoint) = settings.entrypoint {
            result.set_metadata("entrypoint", entrypoint);
        }
        if !settings.env_keys.is_empty() {
            result.set_metadata("env_keys", settings.env_keys);
        }
    }

    fn apply_nix(result: &mut ExtractionResult) {
        let Some(text) = result.file("replit.nix").and_then(|f| f.text()) else {
            return;
        };
        let packages = nix_packages(text);
        if packages.is_empty() {
            return;
        }

        if result.metadata_str("language").is_none() {
            let hint = packages.iter().find_map(|p| {
                let root = p.split('.').next().unwrap_or(p);
                Language::from_platform_name(root)
            });
            if let Some(language) = hint {
                result.set_metadata("language", language.as_str());
            }
        }
        result.set_metadata("nix_packages", packages);
    }
}

impl PlatformExtractor for ReplitExtractor {
    fn platform(&self) -> Platform {
        Platform::Replit
    }

    fn detect(&self, fs: &dyn FileSystem, root: &Path) -> bool {
        find_marker(fs, root, MARKERS).is_some()
    }

    fn extract(&self, ctx: &ExtractContext<'_>) -> Result<ExtractionResult> {
        let mut result = collect_tree(ctx, Platform::Replit)?;
        if let Some(marker) = find_marker(ctx.fs, ctx.root, MARKERS) {
            result.set_metadata("marker_file", marker);
        }
        Self::apply_config(&mut result);
        Self::apply_nix(&mut result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::platform::test_support::extract_with;
    use crate::util::CancellationToken;
    use serde_json::json;

    #[test]
    fn test_detect_markers() {
        let fs = MockFileSystem::new();
        assert!(!ReplitExtractor.detect(&fs, fs.root()));

        fs.add_dir(".config/replit");
        assert!(ReplitExtractor.detect(&fs, fs.root()));
    }

    #[test]
    fn test_settings_from_toml() {
        let config = parse_config(
            r#"
entrypoint = "main.py"
modules = ["python-3.11", "web"]
run = ["python", "main.py"]

[env]
DATABASE_URL = "postgres://secret"
API_KEY = "abc"
"#,
        )
        .unwrap();

        let settings = ReplitSettings::from_config(&config);
        assert_eq!(settings.run_command.as_deref(), Some("python main.py"));
        assert_eq!(settings.language.as_deref(), Some("python"));
        assert_eq!(settings.entrypoint.as_deref(), Some("main.py"));
        assert_eq!(settings.env_keys, vec!["DATABASE_URL", "API_KEY"]);
    }

    #[test]
    fn test_deployment_run_fallback_and_language_key() {
        let config = parse_config(
            "language = \"nodejs\"\n\n[deployment]\nrun = [\"sh\", \"-c\", \"npm start\"]\n",
        )
        .unwrap();
        let settings = ReplitSettings::from_config(&config);
        assert_eq!(settings.run_command.as_deref(), Some("sh -c npm start"));
        assert_eq!(settings.language.as_deref(), Some("javascript"));
    }

    #[test]
    fn test_json_fallback() {
        let config = parse_config(r#"{"run": "node index.js", "language": "nodejs"}"#).unwrap();
        assert_eq!(config, json!({"run": "node index.js", "language": "nodejs"}));
        assert!(parse_config("run = [unterminated").is_err());
    }

    #[test]
    fn test_nix_packages() {
        let packages = nix_packages(
            "{ pkgs }: {\n  deps = [\n    pkgs.python311\n    pkgs.python311Packages.pip\n    pkgs.nodejs-18_x\n    pkgs.python311\n  ];\n}\n",
        );
        assert_eq!(
            packages,
            vec!["python311", "python311Packages.pip", "nodejs-18_x"]
        );
    }

    #[test]
    fn test_extract_records_metadata() {
        let fs = MockFileSystem::new();
        fs.add_file(
            ".replit",
            "run = \"python main.py\"\n\n[env]\nSECRET_KEY = \"hunter2\"\n",
        );
        fs.add_file("replit.nix", "{ pkgs }: { deps = [ pkgs.python310 ]; }\n");
        fs.add_file("main.py", "import flask\n");

        let result = extract_with(&ReplitExtractor, &fs, &CancellationToken::new());
        assert_eq!(result.platform, Platform::Replit);
        assert_eq!(result.metadata_str("marker_file"), Some(".replit"));
        assert_eq!(result.metadata_str("run_command"), Some("python main.py"));
        assert_eq!(result.metadata_str("language"), Some("python"));
        assert_eq!(result.metadata["env_keys"], json!(["SECRET_KEY"]));
        assert_eq!(result.metadata["nix_packages"], json!(["python310"]));
        assert!(!result.metadata.values().any(|v| v.to_string().contains("hunter2")));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_malformed_replit_file_still_copied() {
        let fs = MockFileSystem::new();
        fs.add_file(".replit", "run = [oops\n");
        fs.add_file("main.go", "package main\n");

        let result = extract_with(&ReplitExtractor, &fs, &CancellationToken::new());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::MarkerUnparsable);
        assert_eq!(result.warnings[0].path.as_deref(), Some(".replit"));
        assert!(result.has_file(".replit"));
        assert!(result.metadata_str("run_command").is_none());
    }
}
