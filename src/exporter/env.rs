//! Dotenv handling: secret files stay behind, their keys survive as a template

use crate::extraction::ExtractionResult;
use regex::Regex;
use std::sync::OnceLock;

const TEMPLATE_SUFFIXES: &[&str] = &["example", "sample", "template"];

fn env_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=").expect("valid regex")
    })
}

/// `.env`, `.env.local`, `.env.production`, ... but not `.env.example`
pub fn is_dotenv_secret(file_name: &str) -> bool {
    if file_name == ".env" {
        return true;
    }
    match file_name.strip_prefix(".env.") {
        Some(suffix) => !suffix.is_empty() && !TEMPLATE_SUFFIXES.contains(&suffix),
        None => false,
    }
}

fn is_dotenv(file_name: &str) -> bool {
    file_name == ".env" || file_name.starts_with(".env.")
}

/// Variable names assigned in dotenv text, in file order
pub fn dotenv_keys(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| env_key_regex().captures(l).map(|c| c[1].to_string()))
        .collect()
}

/// Keys from every dotenv file plus those recorded by the extractor
pub fn collect_env_keys(result: &ExtractionResult) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut push = |key: String| {
        if !keys.contains(&key) {
            keys.push(key);
        }
    };

    for file in result.files.iter().filter(|f| is_dotenv(f.file_name())) {
        if let Some(text) = file.text() {
            dotenv_keys(text).into_iter().for_each(&mut push);
        }
    }

    if let Some(recorded) = result.metadata.get("env_keys").and_then(|v| v.as_array()) {
        recorded
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .for_each(&mut push);
    }

    keys
}

pub fn render_env_example(project_name: &str, keys: &[String]) -> String {
    let mut out = format!("# Environment variables for {}\n", project_name);
    if keys.is_empty() {
        out.push_str("# No variables were found in the source project\n");
    }
    for key in keys {
        out.push_str(key);
        out.push_str("=\n");
    }
    out
}

pub fn render_gitignore() -> String {
    [
        "# Dependencies",
        "node_modules/",
        "__pycache__/",
        "*.pyc",
        ".venv/",
        "venv/",
        "",
        "# Build output",
        "dist/",
        "build/",
        "target/",
        "*.egg-info/",
        "",
        "# Environment",
        ".env",
        ".env.*",
        "!.env.example",
        "",
        "# Editors and OS",
        ".vscode/",
        ".idea/",
        ".DS_Store",
        "*.log",
        "",
    ]
    .join("\n")
}
