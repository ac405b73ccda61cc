//! Line-prefix extraction of function, type and method names from added diff lines.
//!
//! This is not a parser. Each language gets a handful of anchored patterns
//! that match the common declaration forms and nothing else.

use std::sync::LazyLock;

use regex_lite::Regex;

static GO_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*[\[(]").expect("Invalid regex"));

static GO_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^func\s+\([^)]*\)\s*([A-Za-z_]\w*)\s*\(").expect("Invalid regex"));

static JS_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\*?\s+([A-Za-z_$][\w$]*)\s*\(").expect("Invalid regex")
});

static JS_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>")
        .expect("Invalid regex")
});

static PY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("Invalid regex"));

static RUST_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+\S+\s+)?fn\s+([A-Za-z_]\w*)")
        .expect("Invalid regex")
});

static JAVA_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)+[\w<>\[\],\s]*?\b([A-Za-z_]\w*)\s*\(")
        .expect("Invalid regex")
});

static GO_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(?:struct|interface)\b").expect("Invalid regex")
});

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|abstract|final|static)\s+)*class\s+([A-Za-z_$][\w$]*)")
        .expect("Invalid regex")
});

static RUST_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?(?:struct|enum|trait|union)\s+([A-Za-z_]\w*)")
        .expect("Invalid regex")
});

static TS_INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)").expect("Invalid regex")
});

/// Control-flow keywords that look like calls to the Java pattern.
const NOT_METHOD_NAMES: &[&str] = &["if", "for", "while", "switch", "catch", "return", "new"];

/// Names of functions declared on added lines, first-seen order, deduplicated.
pub fn detect_functions(diff: &str) -> Vec<String> {
    let mut found = Vec::new();
    for line in added_lines(diff) {
        if let Some(name) = capture(&GO_FUNC, line) {
            push_unique(&mut found, name);
        }
        if let Some(name) = capture(&JS_FUNCTION, line) {
            push_unique(&mut found, name);
        }
        if let Some(name) = capture(&JS_ARROW, line) {
            push_unique(&mut found, name);
        }
        if let Some(name) = capture(&PY_DEF, line) {
            push_unique(&mut found, name);
        }
        if let Some(name) = capture(&RUST_FN, line) {
            push_unique(&mut found, name);
        }
        if line.contains(" class ") {
            continue;
        }
        if let Some(name) = capture(&JAVA_METHOD, line).filter(|n| !NOT_METHOD_NAMES.contains(n)) {
            push_unique(&mut found, name);
        }
    }
    found
}

/// Names of structs, classes, interfaces and similar type declarations.
pub fn detect_structs(diff: &str) -> Vec<String> {
    let mut found = Vec::new();
    for line in added_lines(diff) {
        let name = capture(&GO_TYPE, line)
            .or_else(|| capture(&CLASS, line))
            .or_else(|| capture(&RUST_TYPE, line))
            .or_else(|| capture(&TS_INTERFACE, line));
        if let Some(name) = name {
            push_unique(&mut found, name);
        }
    }
    found
}

/// Names of methods: Go receiver functions and `self`-taking functions.
pub fn detect_methods(diff: &str) -> Vec<String> {
    let mut found = Vec::new();
    for line in added_lines(diff) {
        if let Some(name) = capture(&GO_METHOD, line) {
            push_unique(&mut found, name);
            continue;
        }
        let takes_self = line.contains("(self") || line.contains("(&self") || line.contains("(&mut self");
        if takes_self {
            let name = capture(&PY_DEF, line).or_else(|| capture(&RUST_FN, line));
            if let Some(name) = name {
                push_unique(&mut found, name);
            }
        }
    }
    found
}

/// Whether any removed line declared a function.
pub fn removes_function(diff: &str) -> bool {
    diff.lines()
        .filter(|l| l.starts_with('-') && !l.starts_with("---"))
        .map(|l| l[1..].trim())
        .any(|line| {
            GO_FUNC.is_match(line)
                || PY_DEF.is_match(line)
                || RUST_FN.is_match(line)
                || JS_FUNCTION.is_match(line)
        })
}

fn added_lines(diff: &str) -> impl Iterator<Item = &str> {
    diff.lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .map(|l| l[1..].trim())
}

fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
}

fn push_unique(found: &mut Vec<String>, name: &str) {
    if !found.iter().any(|existing| existing == name) {
        found.push(name.to_string());
    }
}
