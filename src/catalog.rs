//! Static knowledge about language standard libraries and import-name aliases

use crate::languages::Language;

const PYTHON_STDLIB: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio",
    "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect", "builtins", "bz2",
    "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs", "codeop",
    "collections", "colorsys", "compileall", "concurrent", "configparser", "contextlib",
    "contextvars", "copy", "copyreg", "cProfile", "crypt", "csv", "ctypes", "curses",
    "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis", "doctest", "email",
    "encodings", "ensurepip", "enum", "errno", "faulthandler", "fcntl", "filecmp", "fileinput",
    "fnmatch", "fractions", "ftplib", "functools", "gc", "getopt", "getpass", "gettext", "glob",
    "graphlib", "grp", "gzip", "hashlib", "heapq", "hmac", "html", "http", "imaplib", "imghdr",
    "imp", "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword", "lib2to3",
    "linecache", "locale", "logging", "lzma", "mailbox", "mailcap", "marshal", "math",
    "mimetypes", "mmap", "modulefinder", "msvcrt", "multiprocessing", "netrc", "nntplib",
    "numbers", "operator", "optparse", "os", "ossaudiodev", "pathlib", "pdb", "pickle",
    "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib", "posix", "pprint",
    "profile", "pstats", "pty", "pwd", "py_compile", "pyclbr", "pydoc", "queue", "quopri",
    "random", "re", "readline", "reprlib", "resource", "rlcompleter", "runpy", "sched",
    "secrets", "select", "selectors", "shelve", "shlex", "shutil", "signal", "site", "smtpd",
    "smtplib", "sndhdr", "socket", "socketserver", "spwd", "sqlite3", "ssl", "stat",
    "statistics", "string", "stringprep", "struct", "subprocess", "sunau", "symtable", "sys",
    "sysconfig", "syslog", "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "textwrap",
    "threading", "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace",
    "traceback", "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata", "unittest",
    "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref", "webbrowser", "winreg",
    "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib",
    "zoneinfo",
];

const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "test", "timers",
    "tls", "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

const RUST_STDLIB: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Import name → distribution name for Python packages whose import differs
/// from what pip installs.
const PYTHON_ALIASES: &[(&str, &str)] = &[
    ("yaml", "PyYAML"),
    ("PIL", "Pillow"),
    ("cv2", "opencv-python"),
    ("sklearn", "scikit-learn"),
    ("skimage", "scikit-image"),
    ("bs4", "beautifulsoup4"),
    ("dotenv", "python-dotenv"),
    ("dateutil", "python-dateutil"),
    ("jwt", "PyJWT"),
    ("jose", "python-jose"),
    ("MySQLdb", "mysqlclient"),
    ("attr", "attrs"),
    ("serial", "pyserial"),
    ("Crypto", "pycryptodome"),
    ("OpenSSL", "pyOpenSSL"),
    ("socketio", "python-socketio"),
    ("telegram", "python-telegram-bot"),
    ("docx", "python-docx"),
    ("fitz", "PyMuPDF"),
    ("github", "PyGithub"),
    ("multipart", "python-multipart"),
    ("slugify", "python-slugify"),
    ("magic", "python-magic"),
    ("google.generativeai", "google-generativeai"),
    ("googleapiclient", "google-api-python-client"),
    ("psycopg2", "psycopg2-binary"),
    ("discord", "discord.py"),
    ("win32api", "pywin32"),
];

/// True when `module` is part of `language`'s standard library.
///
/// `module` is the full import reference; only its root is compared.
pub fn is_stdlib(language: Language, module: &str) -> bool {
    match language {
        Language::Python => {
            let root = module.split('.').next().unwrap_or(module);
            PYTHON_STDLIB.contains(&root)
        }
        Language::JavaScript | Language::TypeScript => {
            if module.starts_with("node:") || module.starts_with("bun:") {
                return true;
            }
            let root = module.split('/').next().unwrap_or(module);
            NODE_BUILTINS.contains(&root)
        }
        Language::Rust => {
            let root = module.split("::").next().unwrap_or(module);
            RUST_STDLIB.contains(&root)
        }
        // Third-party Go modules always start with a host containing a dot
        Language::Go => {
            let root = module.split('/').next().unwrap_or(module);
            module == "C" || !root.contains('.')
        }
        _ => false,
    }
}

/// pip distribution name for a Python import, honoring known aliases.
///
/// Dotted aliases (`google.generativeai`) are matched before the top-level module.
pub fn python_package_for_import(module: &str) -> String {
    for (import, package) in PYTHON_ALIASES {
        if import.contains('.') && (module == *import || module.starts_with(&format!("{}.", import)))
        {
            return package.to_string();
        }
    }

    let root = module.split('.').next().unwrap_or(module);
    PYTHON_ALIASES
        .iter()
        .find(|(import, _)| *import == root)
        .map(|(_, package)| package.to_string())
        .unwrap_or_else(|| root.to_string())
}

/// Standard-library module names known for `language`
pub fn stdlib_modules(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => PYTHON_STDLIB,
        Language::JavaScript | Language::TypeScript => NODE_BUILTINS,
        Language::Rust => RUST_STDLIB,
        _ => &[],
    }
}
