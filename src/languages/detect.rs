use super::Language;
use regex::Regex;
use std::sync::OnceLock;

/// Language implied by a file name alone. `None` when the name carries no
/// extension or an ambiguous one (`.h`), in which case content sniffing decides.
pub fn detect_language_from_path(path: &str) -> Option<Language> {
    let name = path.rsplit('/').next().unwrap_or(path);

    match name {
        "Rakefile" | "Gemfile" | "Guardfile" | "config.ru" => return Some(Language::Ruby),
        "SConstruct" | "SConscript" => return Some(Language::Python),
        _ => {}
    }

    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles like `.bashrc` have no extension
        return None;
    }

    let language = match ext.to_ascii_lowercase().as_str() {
        "py" | "pyi" | "pyw" => Language::Python,
        "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
        "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
        "go" => Language::Go,
        "rs" => Language::Rust,
        "java" => Language::Java,
        "kt" | "kts" => Language::Kotlin,
        "rb" | "rake" | "gemspec" => Language::Ruby,
        "php" | "phtml" => Language::Php,
        "c" => Language::C,
        "cc" | "cpp" | "cxx" | "c++" | "hpp" | "hh" | "hxx" => Language::Cpp,
        "swift" => Language::Swift,
        "sh" | "bash" | "zsh" => Language::Shell,
        "h" => return None,
        _ => Language::Unknown,
    };
    Some(language)
}

/// Detect the language of a file, sniffing `content` when the extension is
/// absent or ambiguous.
pub fn detect_language(path: &str, content: Option<&[u8]>) -> Language {
    if let Some(language) = detect_language_from_path(path) {
        return language;
    }

    let Some(content) = content else {
        return if path.ends_with(".h") {
            Language::C
        } else {
            Language::Unknown
        };
    };

    if path.ends_with(".h") {
        return sniff_header(content);
    }

    sniff_shebang(content).unwrap_or(Language::Unknown)
}

fn sniff_shebang(content: &[u8]) -> Option<Language> {
    let first_line = content.split(|b| *b == b'\n').next()?;
    let line = std::str::from_utf8(first_line).ok()?.trim();
    let interpreter_line = line.strip_prefix("#!")?;

    // `#!/usr/bin/env -S deno run` and `#!/bin/bash -e` both reduce to one word
    let mut words = interpreter_line.split_whitespace();
    let mut program = words.next()?.rsplit('/').next()?;
    if program == "env" {
        program = words.find(|w| !w.starts_with('-'))?;
    }

    let base = program.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    match base {
        "python" | "pypy" => Some(Language::Python),
        "node" | "nodejs" => Some(Language::JavaScript),
        "deno" | "ts-node" | "tsx" => Some(Language::TypeScript),
        "bash" | "sh" | "zsh" | "dash" | "ksh" => Some(Language::Shell),
        "ruby" => Some(Language::Ruby),
        "php" => Some(Language::Php),
        _ => None,
    }
}

fn cpp_construct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(namespace\s+\w+|class\s+\w+[^;]*\{|template\s*<|using\s+namespace\b|#include\s*<(iostream|string|vector|memory|map)>)|std::",
        )
        .expect("valid regex")
    })
}

fn sniff_header(content: &[u8]) -> Language {
    let text = String::from_utf8_lossy(content);
    if cpp_construct_regex().is_match(&text) {
        Language::Cpp
    } else {
        Language::C
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        python = { "app/main.py", Language::Python },
        stub = { "types.pyi", Language::Python },
        jsx = { "src/App.jsx", Language::JavaScript },
        esm = { "index.mjs", Language::JavaScript },
        tsx = { "src/App.tsx", Language::TypeScript },
        go = { "cmd/server/main.go", Language::Go },
        rust = { "src/lib.rs", Language::Rust },
        kotlin_script = { "build.gradle.kts", Language::Kotlin },
        rakefile = { "Rakefile", Language::Ruby },
        cpp = { "engine.cpp", Language::Cpp },
        shell = { "scripts/run.sh", Language::Shell },
        markdown = { "README.md", Language::Unknown },
    )]
    fn test_detect_by_extension(path: &str, expected: Language) {
        assert_eq!(detect_language(path, None), expected);
    }

    #[parameterized(
        python_env = { "#!/usr/bin/env python3\nprint('x')\n", Language::Python },
        python_direct = { "#!/usr/bin/python3.11\n", Language::Python },
        node = { "#!/usr/bin/env node\nconsole.log(1)\n", Language::JavaScript },
        deno = { "#!/usr/bin/env -S deno run --allow-net\n", Language::TypeScript },
        bash = { "#!/bin/bash -e\necho hi\n", Language::Shell },
        ruby = { "#!/usr/bin/env ruby\n", Language::Ruby },
        php = { "#!/usr/bin/php\n<?php\n", Language::Php },
        none = { "just text\n", Language::Unknown },
    )]
    fn test_detect_by_shebang(content: &str, expected: Language) {
        assert_eq!(detect_language("bin/tool", Some(content.as_bytes())), expected);
    }

    #[test]
    fn test_extension_wins_over_shebang() {
        let content = b"#!/usr/bin/env node\n";
        assert_eq!(detect_language("script.py", Some(content)), Language::Python);
    }

    #[test]
    fn test_header_sniffing() {
        let c_header = b"#ifndef UTIL_H\n#define UTIL_H\nint add(int a, int b);\n#endif\n";
        let cpp_header = b"#pragma once\nnamespace util {\nclass Buffer {\n};\n}\n";

        assert_eq!(detect_language("util.h", Some(c_header)), Language::C);
        assert_eq!(detect_language("buffer.h", Some(cpp_header)), Language::Cpp);
        assert_eq!(detect_language("plain.h", None), Language::C);
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert_eq!(detect_language_from_path(".bashrc"), None);
        assert_eq!(detect_language(".replit", Some(b"run = \"x\"\n")), Language::Unknown);
    }
}
