//! Regex-driven structural extraction for languages without a grammar parser

use super::{push_unique, CodeStructuralSummary, ParseError, StructureParser};
use crate::languages::Language;
use regex::Regex;
use std::sync::OnceLock;

pub struct PatternParser;

impl PatternParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PatternParser {
    fn default() -> Self {
        Self::new()
    }
}

struct Patterns {
    js_imports: Vec<Regex>,
    js_functions: Vec<Regex>,
    js_classes: Vec<Regex>,
    js_named_exports: Regex,
    js_default_export: Regex,
    js_export_list: Regex,
    js_commonjs_export: Regex,
    js_commonjs_object: Regex,

    go_import_single: Regex,
    go_import_block: Regex,
    go_quoted: Regex,
    go_func: Regex,
    go_type: Regex,
    go_type_block: Regex,
    go_type_block_item: Regex,

    rust_use: Regex,
    rust_fn: Regex,
    rust_types: Regex,
    rust_pub: Regex,

    jvm_import: Regex,
    java_method: Regex,
    kotlin_fun: Regex,
    jvm_types: Regex,

    ruby_require: Regex,
    ruby_def: Regex,
    ruby_types: Regex,

    php_imports: Vec<Regex>,
    php_function: Regex,
    php_types: Regex,

    c_include: Regex,
    c_function: Regex,
    c_types: Regex,

    swift_import: Regex,
    swift_func: Regex,
    swift_types: Regex,

    shell_function: Regex,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        js_imports: vec![
            re(r#"\bimport\s+(?:type\s+)?(?:[^'";]*?\s+from\s*)?['"]([^'"\n]+)['"]"#),
            re(r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#),
            re(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#),
            re(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#),
        ],
        js_functions: vec![
            re(r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\("),
            re(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::\s*[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)"),
        ],
        js_classes: vec![
            re(r"\bclass\s+([A-Za-z_$][\w$]*)"),
            re(r"\binterface\s+([A-Za-z_$][\w$]*)"),
            re(r"(?m)^\s*(?:export\s+)?(?:declare\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*="),
            re(r"(?m)^\s*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)"),
        ],
        js_named_exports: re(
            r"(?m)^\s*export\s+(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\s*\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
        ),
        js_default_export: re(r"(?m)^\s*export\s+default\b"),
        js_export_list: re(r"\bexport\s+(?:type\s+)?\{([^}]*)\}"),
        js_commonjs_export: re(r"\b(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*="),
        js_commonjs_object: re(r"\bmodule\.exports\s*=\s*\{([^}]*)\}"),

        go_import_single: re(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#),
        go_import_block: re(r"(?ms)^\s*import\s*\((.*?)\)"),
        go_quoted: re(r#""([^"]+)""#),
        go_func: re(r"(?m)^func\s+(\([^)]*\)\s*)?([A-Za-z_]\w*)"),
        go_type: re(r"(?m)^type\s+([A-Za-z_]\w*)\b"),
        go_type_block: re(r"(?ms)^type\s*\((.*?)^\)"),
        go_type_block_item: re(r"(?m)^\s+([A-Za-z_]\w*)\s+\S"),

        rust_use: re(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:use\s+(?:::)?|extern\s+crate\s+)([A-Za-z_]\w*)"),
        rust_fn: re(r#"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+|async\s+|unsafe\s+|extern\s+"[^"]*"\s+)*fn\s+([A-Za-z_]\w*)"#),
        rust_types: re(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?(?:struct|enum|trait|type|union)\s+([A-Za-z_]\w*)"),
        rust_pub: re(r#"(?m)^\s*pub\s+(?:const\s+|async\s+|unsafe\s+|extern\s+"[^"]*"\s+)*(?:fn|struct|enum|trait|type|mod|const|static|union)\s+([A-Za-z_]\w*)"#),

        jvm_import: re(r"(?m)^\s*import\s+(?:static\s+)?(\w+(?:\.\w+)*(?:\.\*)?)"),
        java_method: re(r"(?m)^\s*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)+(?:<[^>]+>\s+)?[\w<>\[\],.? ]+?\s+([A-Za-z_]\w*)\s*\("),
        kotlin_fun: re(r"\bfun\s+(?:<[^>]+>\s*)?(?:[\w.]+\.)?([A-Za-z_]\w*)\s*\("),
        jvm_types: re(r"(?m)^\s*(?:(?:public|private|protected|internal|abstract|final|static|open|data|sealed|enum|annotation|inner)\s+)*(?:class|interface|enum|record|object)\s+([A-Za-z_]\w*)"),

        ruby_require: re(r#"(?m)^\s*(?:require|require_relative|load)\s*\(?\s*['"]([^'"]+)['"]"#),
        ruby_def: re(r"(?m)^\s*def\s+(?:self\.)?([A-Za-z_]\w*[?!=]?)"),
        ruby_types: re(r"(?m)^\s*(?:class|module)\s+([A-Z]\w*(?:::\w+)*)"),

        php_imports: vec![
            re(r"(?m)^\s*use\s+\\?([A-Za-z_][\w\\]*)"),
            re(r#"\b(?:require|include)(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#),
        ],
        php_function: re(r"\bfunction\s+&?\s*([A-Za-z_]\w*)\s*\("),
        php_types: re(r"(?m)^\s*(?:abstract\s+|final\s+|readonly\s+)*(?:class|interface|trait|enum)\s+([A-Za-z_]\w*)"),

        c_include: re(r#"(?m)^\s*#\s*include\s*[<"]([^>"]+)[>"]"#),
        c_function: re(r"(?m)^[A-Za-z_][\w \t\*&:<>,]*?[\s\*&]([A-Za-z_][\w:~]*)\s*\([^;{]*\)\s*(?:const\s*)?(?:noexcept\s*)?\{"),
        c_types: re(r"(?m)^\s*(?:template\s*<[^>]*>\s*)?(?:typedef\s+)?(?:class|struct|enum(?:\s+class)?|union)\s+([A-Za-z_]\w*)\s*(?:final\s*)?(?::[^{;]*)?\{"),

        swift_import: re(r"(?m)^\s*(?:@testable\s+)?import\s+(?:(?:class|struct|enum|protocol|func|var|let|typealias)\s+)?([\w.]+)"),
        swift_func: re(r"\bfunc\s+([A-Za-z_]\w*)"),
        swift_types: re(r"\b(?:class|struct|enum|protocol|actor)\s+([A-Za-z_]\w*)"),

        shell_function: re(r"(?m)^\s*(?:function\s+([A-Za-z_][\w-]*)|([A-Za-z_][\w-]*)\s*\(\s*\))"),
    })
}

const C_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "return", "sizeof", "catch"];

/// Every capture of group 1 (or the first participating group) across
/// `regexes`, ordered by position in `content`.
fn captures_in_order(regexes: &[&Regex], content: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = Vec::new();
    for regex in regexes {
        for caps in regex.captures_iter(content) {
            if let Some(m) = caps.iter().skip(1).flatten().next() {
                found.push((m.start(), m.as_str()));
            }
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut out = Vec::new();
    for (_, name) in found {
        push_unique(&mut out, name);
    }
    out
}

/// `a, b as c, type D` → `a`, `c`, `D`
fn export_list_names(list: &str, out: &mut Vec<String>) {
    for item in list.split(',') {
        let item = item.trim().trim_start_matches("type ").trim();
        let name = match item.rsplit_once(" as ") {
            Some((_, alias)) => alias.trim(),
            None => item,
        };
        let name = name.split(':').next().unwrap_or(name).trim();
        if name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            push_unique(out, name);
        }
    }
}

fn parse_javascript(content: &str, summary: &mut CodeStructuralSummary) {
    let p = patterns();
    summary.imports = captures_in_order(&p.js_imports.iter().collect::<Vec<_>>(), content);
    summary.functions = captures_in_order(&p.js_functions.iter().collect::<Vec<_>>(), content);
    summary.classes = captures_in_order(&p.js_classes.iter().collect::<Vec<_>>(), content);

    let mut exports = captures_in_order(&[&p.js_named_exports, &p.js_commonjs_export], content);
    if p.js_default_export.is_match(content) {
        push_unique(&mut exports, "default");
    }
    for caps in p.js_export_list.captures_iter(content) {
        export_list_names(&caps[1], &mut exports);
    }
    for caps in p.js_commonjs_object.captures_iter(content) {
        export_list_names(&caps[1], &mut exports);
    }
    summary.exports = exports;
}

fn is_exported_go_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn parse_go(content: &str, summary: &mut CodeStructuralSummary) {
    let p = patterns();

    let mut imports: Vec<(usize, String)> = p
        .go_import_single
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())))
        .collect();
    for block in p.go_import_block.captures_iter(content) {
        let Some(body) = block.get(1) else { continue };
        for quoted in p.go_quoted.captures_iter(body.as_str()) {
            if let Some(m) = quoted.get(1) {
                imports.push((body.start() + m.start(), m.as_str().to_string()));
            }
        }
    }
    imports.sort_by_key(|(pos, _)| *pos);
    for (_, import) in &imports {
        push_unique(&mut summary.imports, import);
    }

    for caps in p.go_func.captures_iter(content) {
        let name = &caps[2];
        summary.functions.push(name.to_string());
        let is_method = caps.get(1).is_some();
        if !is_method && is_exported_go_name(name) {
            push_unique(&mut summary.exports, name);
        }
    }

    let mut types = captures_in_order(&[&p.go_type], content);
    for block in p.go_type_block.captures_iter(content) {
        for item in p.go_type_block_item.captures_iter(&block[1]) {
            push_unique(&mut types, &item[1]);
        }
    }
    for name in &types {
        if is_exported_go_name(name) {
            push_unique(&mut summary.exports, name);
        }
    }
    summary.classes = types;
}

fn parse_rust(content: &str, summary: &mut CodeStructuralSummary) {
    let p = patterns();
    summary.imports = captures_in_order(&[&p.rust_use], content);
    summary.functions = captures_in_order(&[&p.rust_fn], content);
    summary.classes = captures_in_order(&[&p.rust_types], content);
    summary.exports = captures_in_order(&[&p.rust_pub], content);
}

fn parse_jvm(content: &str, language: Language, summary: &mut CodeStructuralSummary) {
    let p = patterns();
    summary.imports = captures_in_order(&[&p.jvm_import], content);
    summary.functions = match language {
        Language::Kotlin => captures_in_order(&[&p.kotlin_fun], content),
        _ => captures_in_order(&[&p.java_method], content),
    };
    summary.classes = captures_in_order(&[&p.jvm_types], content);
}

fn parse_c_family(content: &str, summary: &mut CodeStructuralSummary) {
    let p = patterns();
    summary.imports = captures_in_order(&[&p.c_include], content);
    summary.functions = captures_in_order(&[&p.c_function], content)
        .into_iter()
        .filter(|name| !C_KEYWORDS.contains(&name.as_str()))
        .collect();
    summary.classes = captures_in_order(&[&p.c_types], content);
}

impl StructureParser for PatternParser {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn supports(&self, language: Language) -> bool {
        !matches!(language, Language::Python | Language::Unknown)
    }

    fn parse(
        &self,
        content: &str,
        language: Language,
    ) -> Result<CodeStructuralSummary, ParseError> {
        let p = patterns();
        let mut summary = CodeStructuralSummary::empty("", language);

        match language {
            Language::JavaScript | Language::TypeScript => parse_javascript(content, &mut summary),
            Language::Go => parse_go(content, &mut summary),
            Language::Rust => parse_rust(content, &mut summary),
            Language::Java | Language::Kotlin => parse_jvm(content, language, &mut summary),
            Language::Ruby => {
                summary.imports = captures_in_order(&[&p.ruby_require], content);
                summary.functions = captures_in_order(&[&p.ruby_def], content);
                summary.classes = captures_in_order(&[&p.ruby_types], content);
            }
            Language::Php => {
                summary.imports = captures_in_order(&p.php_imports.iter().collect::<Vec<_>>(), content);
                summary.functions = captures_in_order(&[&p.php_function], content);
                summary.classes = captures_in_order(&[&p.php_types], content);
            }
            Language::C | Language::Cpp => parse_c_family(content, &mut summary),
            Language::Swift => {
                summary.imports = captures_in_order(&[&p.swift_import], content);
                summary.functions = captures_in_order(&[&p.swift_func], content);
                summary.classes = captures_in_order(&[&p.swift_types], content);
            }
            Language::Shell => {
                summary.functions = captures_in_order(&[&p.shell_function], content);
            }
            Language::Python | Language::Unknown => return Err(ParseError::Unsupported(language)),
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str, language: Language) -> CodeStructuralSummary {
        PatternParser::new().parse(content, language).unwrap()
    }

    #[test]
    fn test_javascript_imports() {
        let source = r#"
import React, { useState } from 'react';
import {
  BrowserRouter,
  Route,
} from "react-router-dom";
import './styles.css';
import type { Props } from '@/types';
const _ = require('lodash');
export * from './util';
const lazy = import('chart.js');
"#;
        let summary = parse(source, Language::JavaScript);
        assert_eq!(
            summary.imports,
            vec![
                "react",
                "react-router-dom",
                "./styles.css",
                "@/types",
                "lodash",
                "./util",
                "chart.js"
            ]
        );
    }

    #[test]
    fn test_javascript_exports_and_functions() {
        let source = r#"
export function handler(req, res) {}
export const config = { runtime: 'edge' };
const helper = async (x) => x * 2;
const double = x => x * 2;
function internal() {}
export { helper as assist, double };
export default App;
module.exports.legacy = internal;
class App extends Component {}
"#;
        let summary = parse(source, Language::JavaScript);
        assert_eq!(summary.functions, vec!["handler", "helper", "double", "internal"]);
        assert_eq!(summary.classes, vec!["App"]);
        assert_eq!(
            summary.exports,
            vec!["handler", "config", "legacy", "default", "assist", "double"]
        );
    }

    #[test]
    fn test_typescript_types() {
        let source = r#"
export interface User { id: string }
export type Id = string | number;
enum Color { Red, Green }
export abstract class Repo<T> {}
"#;
        let summary = parse(source, Language::TypeScript);
        assert_eq!(summary.classes, vec!["User", "Id", "Color", "Repo"]);
        assert_eq!(summary.exports, vec!["User", "Id", "Repo"]);
    }

    #[test]
    fn test_commonjs_object_exports() {
        let summary = parse(
            "function a() {}\nfunction b() {}\nmodule.exports = { a, b: b };\n",
            Language::JavaScript,
        );
        assert_eq!(summary.exports, vec!["a", "b"]);
    }

    #[test]
    fn test_go_structure() {
        let source = r#"package main

import "fmt"

import (
	"net/http"
	gin "github.com/gin-gonic/gin"
)

type Server struct {
	addr string
}

type (
	handler func()
	Options struct{}
)

func (s *Server) Start() error { return nil }

func NewServer() *Server { return nil }

func main() {}
"#;
        let summary = parse(source, Language::Go);
        assert_eq!(
            summary.imports,
            vec!["fmt", "net/http", "github.com/gin-gonic/gin"]
        );
        assert_eq!(summary.functions, vec!["Start", "NewServer", "main"]);
        assert_eq!(summary.classes, vec!["Server", "handler", "Options"]);
        assert_eq!(summary.exports, vec!["NewServer", "Server", "Options"]);
    }

    #[test]
    fn test_rust_structure() {
        let source = r#"
use std::collections::HashMap;
use serde::Serialize;
pub use crate::config::Config;
extern crate log;

pub struct Engine;
enum State { Idle }
pub(crate) trait Runner {}

pub async fn run() {}
fn helper() {}
pub const LIMIT: usize = 4;
"#;
        let summary = parse(source, Language::Rust);
        assert_eq!(summary.imports, vec!["std", "serde", "crate", "log"]);
        assert_eq!(summary.functions, vec!["run", "helper"]);
        assert_eq!(summary.classes, vec!["Engine", "State", "Runner"]);
        assert_eq!(summary.exports, vec!["Engine", "run", "LIMIT"]);
    }

    #[test]
    fn test_java_structure() {
        let source = r#"
import java.util.List;
import static org.junit.Assert.*;

public class Main {
    public static void main(String[] args) {}
    private List<String> names() { return null; }
}
"#;
        let summary = parse(source, Language::Java);
        assert_eq!(summary.imports, vec!["java.util.List", "org.junit.Assert.*"]);
        assert_eq!(summary.functions, vec!["main", "names"]);
        assert_eq!(summary.classes, vec!["Main"]);
    }

    #[test]
    fn test_kotlin_functions() {
        let summary = parse(
            "import kotlinx.coroutines.launch\n\ndata class User(val id: Int)\n\nfun main() {}\nfun String.shout(): String = this\n",
            Language::Kotlin,
        );
        assert_eq!(summary.functions, vec!["main", "shout"]);
        assert_eq!(summary.classes, vec!["User"]);
    }

    #[test]
    fn test_ruby_and_php() {
        let ruby = parse(
            "require 'sinatra'\nrequire_relative 'lib/db'\n\nmodule Api\n  class App\n    def self.boot; end\n    def ready?; end\n  end\nend\n",
            Language::Ruby,
        );
        assert_eq!(ruby.imports, vec!["sinatra", "lib/db"]);
        assert_eq!(ruby.functions, vec!["boot", "ready?"]);
        assert_eq!(ruby.classes, vec!["Api", "App"]);

        let php = parse(
            "<?php\nuse App\\Models\\User;\nrequire_once 'vendor/autoload.php';\nfinal class Controller {\n  public function index() {}\n}\n",
            Language::Php,
        );
        assert_eq!(php.imports, vec!["App\\Models\\User", "vendor/autoload.php"]);
        assert_eq!(php.functions, vec!["index"]);
        assert_eq!(php.classes, vec!["Controller"]);
    }

    #[test]
    fn test_c_family() {
        let source = r#"#include <stdio.h>
#include "util.h"

struct point {
    int x;
};

static int add(int a, int b) {
    if (a) {
        return a + b;
    }
    return b;
}

int main(void) {
    return 0;
}
"#;
        let summary = parse(source, Language::C);
        assert_eq!(summary.imports, vec!["stdio.h", "util.h"]);
        assert_eq!(summary.functions, vec!["add", "main"]);
        assert_eq!(summary.classes, vec!["point"]);
    }

    #[test]
    fn test_swift_and_shell() {
        let swift = parse(
            "import SwiftUI\n\nstruct ContentView: View {\n  func body() {}\n}\n",
            Language::Swift,
        );
        assert_eq!(swift.imports, vec!["SwiftUI"]);
        assert_eq!(swift.functions, vec!["body"]);
        assert_eq!(swift.classes, vec!["ContentView"]);

        let shell = parse(
            "#!/bin/bash\nsetup() {\n  echo hi\n}\nfunction deploy {\n  echo go\n}\n",
            Language::Shell,
        );
        assert!(shell.imports.is_empty());
        assert_eq!(shell.functions, vec!["setup", "deploy"]);
    }

    #[test]
    fn test_python_not_supported() {
        let parser = PatternParser::new();
        assert!(!parser.supports(Language::Python));
        assert!(matches!(
            parser.parse("import os", Language::Python),
            Err(ParseError::Unsupported(Language::Python))
        ));
    }
}
