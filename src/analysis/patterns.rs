//! Heuristic change-pattern detection over a single file's diff.

use std::collections::BTreeSet;
use std::fmt;

use crate::analysis::change::Change;

/// A named heuristic signal detected in diff text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pattern {
    ErrorHandling,
    TestAddition,
    ImportChanges,
    Documentation,
    Refactoring,
    Configuration,
    ApiChanges,
    Database,
    Performance,
    Security,
    InterfaceImplementation,
    Validation,
    Logging,
    Middleware,
    DependencyInjection,
    Cli,
    TypeDefinition,
    ConstantDefinition,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::ErrorHandling => "error-handling",
            Pattern::TestAddition => "test-addition",
            Pattern::ImportChanges => "import-changes",
            Pattern::Documentation => "documentation",
            Pattern::Refactoring => "refactoring",
            Pattern::Configuration => "configuration",
            Pattern::ApiChanges => "api-changes",
            Pattern::Database => "database",
            Pattern::Performance => "performance",
            Pattern::Security => "security",
            Pattern::InterfaceImplementation => "interface-implementation",
            Pattern::Validation => "validation",
            Pattern::Logging => "logging",
            Pattern::Middleware => "middleware",
            Pattern::DependencyInjection => "dependency-injection",
            Pattern::Cli => "cli",
            Pattern::TypeDefinition => "type-definition",
            Pattern::ConstantDefinition => "constant-definition",
        }
    }

    /// Template vocabulary associated with this pattern, used when scoring.
    pub fn template_keywords(&self) -> &'static [&'static str] {
        match self {
            Pattern::ErrorHandling => &["fix", "error", "handle"],
            Pattern::TestAddition => &["test", "coverage"],
            Pattern::Documentation => &["docs", "document", "comment"],
            Pattern::ApiChanges => &["api", "endpoint", "route"],
            Pattern::Database => &["db", "database", "query", "schema"],
            Pattern::Security => &["security", "auth", "token"],
            Pattern::Performance => &["perf", "optimize", "speed"],
            Pattern::Validation => &["validat", "check", "verify"],
            Pattern::Logging => &["log", "trace", "debug"],
            Pattern::Middleware => &["middleware", "chain"],
            Pattern::InterfaceImplementation => &["implement", "interface"],
            Pattern::Cli => &["command", "flag", "cli"],
            _ => &[],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net new comment lines needed before a change counts as documentation work.
const DOCUMENTATION_MIN_COMMENTS: usize = 3;

/// Lines added and removed in one file beyond which the change reads as a refactor.
const REFACTORING_MIN_LINES: usize = 10;

/// Detect every pattern present in one change.
///
/// Keyword signals only look at added lines; removing a `log.` call is not a
/// logging change.
pub fn detect(change: &Change) -> BTreeSet<Pattern> {
    let mut patterns = BTreeSet::new();

    let added: Vec<&str> = change.added_lines().collect();
    let removed: Vec<&str> = change.removed_lines().collect();
    let added_text = added.join("\n");
    let added_lower = added_text.to_lowercase();
    let any_added = |needles: &[&str]| needles.iter().any(|n| added_text.contains(n));
    let any_added_lower = |needles: &[&str]| needles.iter().any(|n| added_lower.contains(n));

    if any_added(&["if err", "return err", "try {", "catch", "except ", "except:", "rescue"]) {
        patterns.insert(Pattern::ErrorHandling);
    }

    if change.is_test_file()
        && any_added(&["func Test", "def test_", "#[test]", "it(", "describe(", "test("])
    {
        patterns.insert(Pattern::TestAddition);
    }

    if added.iter().chain(removed.iter()).any(|l| is_import_line(l)) {
        patterns.insert(Pattern::ImportChanges);
    }

    let added_comments = added.iter().filter(|l| is_comment_line(l)).count();
    let removed_comments = removed.iter().filter(|l| is_comment_line(l)).count();
    if added_comments.saturating_sub(removed_comments) >= DOCUMENTATION_MIN_COMMENTS {
        patterns.insert(Pattern::Documentation);
    }

    if change.added > REFACTORING_MIN_LINES && change.removed > REFACTORING_MIN_LINES {
        patterns.insert(Pattern::Refactoring);
    }

    if change.path.contains("config")
        || matches!(change.extension.as_str(), "json" | "yaml" | "yml" | "toml")
    {
        patterns.insert(Pattern::Configuration);
    }

    if any_added(&["http.", "router.", "endpoint", "handler", "Handler", "route("]) {
        patterns.insert(Pattern::ApiChanges);
    }

    if any_added_lower(&["sql", "database", "query", "gorm", "migration"]) {
        patterns.insert(Pattern::Database);
    }

    if any_added(&["goroutine", "sync.", "channel", "concurrent", "parallel", "cache"]) {
        patterns.insert(Pattern::Performance);
    }

    if any_added_lower(&["auth", "token", "security", "crypto", "password"]) {
        patterns.insert(Pattern::Security);
    }

    let receiver_method = added.iter().any(|l| l.trim_start().starts_with("func ("));
    let trait_impl = added.iter().any(|l| {
        let t = l.trim_start();
        t.starts_with("impl") && t.contains(" for ")
    });
    if trait_impl || (receiver_method && change.diff.contains("interface")) {
        patterns.insert(Pattern::InterfaceImplementation);
    }

    if any_added_lower(&["validate", "validation"])
        || (added_text.contains("if ") && added_text.contains("return"))
    {
        patterns.insert(Pattern::Validation);
    }

    if any_added(&["log.", "logger.", "Logger", "tracing::", "console.log", "logging."]) {
        patterns.insert(Pattern::Logging);
    }

    if change.path.contains("middleware")
        || ((added_text.contains("func ") || added_text.contains("fn ")) && added_text.contains("next"))
    {
        patterns.insert(Pattern::Middleware);
    }

    if added_text.contains("New") && added_text.contains("return &") {
        patterns.insert(Pattern::DependencyInjection);
    }

    if any_added(&["cobra.Command", "flag.", "clap::", "#[arg(", "argparse", "click.command"]) {
        patterns.insert(Pattern::Cli);
    }

    if added.iter().any(|l| is_type_definition(l)) {
        patterns.insert(Pattern::TypeDefinition);
    }

    if added.iter().any(|l| is_constant_definition(l)) {
        patterns.insert(Pattern::ConstantDefinition);
    }

    patterns
}

fn is_import_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("import ")
        || t.starts_with("import(")
        || t.starts_with("use ")
        || t.starts_with("from ")
        || t.starts_with("#include")
        || t.contains("require(")
}

fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//")
        || t.starts_with("/*")
        || t.starts_with("* ")
        || t.starts_with("# ")
        || t == "#"
        || t.starts_with("\"\"\"")
}

fn is_type_definition(line: &str) -> bool {
    let t = line.trim_start();
    let t = t.strip_prefix("pub ").unwrap_or(t);
    let t = t.strip_prefix("export ").unwrap_or(t);
    ["type ", "struct ", "enum ", "interface ", "trait "]
        .iter()
        .any(|p| t.starts_with(p))
}

fn is_constant_definition(line: &str) -> bool {
    let t = line.trim_start();
    let t = t.strip_prefix("pub ").unwrap_or(t);
    ["const ", "var ", "static "].iter().any(|p| t.starts_with(p))
}
