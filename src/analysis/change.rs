//! Per-file change records produced from the staged diff.

use std::fmt;

/// Combined added + removed lines at which a single file counts as a major change.
pub const MAJOR_CHANGE_THRESHOLD: usize = 500;

/// Root-level files that declare project dependencies.
const DEPENDENCY_MANIFESTS: &[&str] = &[
    "go.mod",
    "Cargo.toml",
    "package.json",
    "requirements.txt",
    "pyproject.toml",
    "Gemfile",
    "composer.json",
    "pom.xml",
];

/// Lockfiles that only ever change alongside dependency updates.
const DEPENDENCY_LOCKFILES: &[&str] = &[
    "go.sum",
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Gemfile.lock",
    "composer.lock",
];

/// What happened to a file, mirroring git's name-status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
}

impl ChangeKind {
    /// Single-letter status code as printed by `git diff --name-status`.
    pub fn code(&self) -> char {
        match self {
            ChangeKind::Add => 'A',
            ChangeKind::Modify => 'M',
            ChangeKind::Delete => 'D',
            ChangeKind::Rename => 'R',
            ChangeKind::Copy => 'C',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' => Some(ChangeKind::Add),
            'M' => Some(ChangeKind::Modify),
            'D' => Some(ChangeKind::Delete),
            'R' => Some(ChangeKind::Rename),
            'C' => Some(ChangeKind::Copy),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "Added"),
            ChangeKind::Modify => write!(f, "Modified"),
            ChangeKind::Delete => write!(f, "Deleted"),
            ChangeKind::Rename => write!(f, "Renamed"),
            ChangeKind::Copy => write!(f, "Copied"),
        }
    }
}

/// One file's staged edit.
///
/// `diff` holds only the `+`/`-` lines of the file's patch (no context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
    pub diff: String,
    pub added: usize,
    pub removed: usize,
    /// Original path for renames and copies.
    pub source: Option<String>,
    /// New path for renames and copies (same as `path`).
    pub target: Option<String>,
    pub extension: String,
    pub is_major: bool,
}

impl Change {
    /// Build a change, counting added/removed lines from the diff text.
    pub fn new(path: impl Into<String>, kind: ChangeKind, diff: impl Into<String>) -> Self {
        let path = path.into();
        let diff = diff.into();
        let (added, removed) = count_lines(&diff);
        Self::with_counts(path, kind, diff, added, removed)
    }

    /// Build a change with line counts supplied by the caller.
    pub fn with_counts(
        path: impl Into<String>,
        kind: ChangeKind,
        diff: impl Into<String>,
        added: usize,
        removed: usize,
    ) -> Self {
        let path = path.into();
        Self {
            extension: file_extension(&path),
            path,
            kind,
            diff: diff.into(),
            added,
            removed,
            source: None,
            target: None,
            is_major: added + removed >= MAJOR_CHANGE_THRESHOLD,
        }
    }

    /// A rename from `source` to `target`.
    pub fn renamed(source: impl Into<String>, target: impl Into<String>, diff: impl Into<String>) -> Self {
        Self::moved(ChangeKind::Rename, source.into(), target.into(), diff.into())
    }

    /// A copy of `source` into `target`.
    pub fn copied(source: impl Into<String>, target: impl Into<String>, diff: impl Into<String>) -> Self {
        Self::moved(ChangeKind::Copy, source.into(), target.into(), diff.into())
    }

    fn moved(kind: ChangeKind, source: String, target: String, diff: String) -> Self {
        let mut change = Self::new(target.clone(), kind, diff);
        change.source = Some(source);
        change.target = Some(target);
        change
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }

    pub fn is_test_file(&self) -> bool {
        is_test_path(&self.path)
    }

    pub fn is_docs_file(&self) -> bool {
        self.path.starts_with("docs/")
            || self.path.starts_with("wiki/")
            || self.extension == "md"
            || self.extension == "txt"
    }

    pub fn is_config_file(&self) -> bool {
        self.path.contains("config")
            || matches!(self.extension.as_str(), "json" | "yaml" | "yml" | "env" | "toml")
            || self.file_name() == "Dockerfile"
    }

    /// A dependency manifest at the repository root (`go.mod`, `Cargo.toml`, ...).
    pub fn is_root_manifest(&self) -> bool {
        DEPENDENCY_MANIFESTS.contains(&self.path.as_str())
    }

    pub fn is_dependency_file(&self) -> bool {
        let name = self.file_name();
        DEPENDENCY_MANIFESTS.contains(&name)
            || DEPENDENCY_LOCKFILES.contains(&name)
            || self.extension == "mod"
            || self.extension == "sum"
    }

    /// Lines added by this change, without the leading `+`.
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.diff
            .lines()
            .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
            .map(|l| &l[1..])
    }

    /// Lines removed by this change, without the leading `-`.
    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.diff
            .lines()
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .map(|l| &l[1..])
    }
}

/// Count `+` and `-` lines, ignoring `+++`/`---` file headers.
fn count_lines(diff: &str) -> (usize, usize) {
    let mut added = 0;
    let mut removed = 0;
    for line in diff.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            added += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            removed += 1;
        }
    }
    (added, removed)
}

/// Extension of the final path component.
///
/// Dotfiles keep their name as the extension (`.env` -> `env`), and a bare
/// `Dockerfile` reports `Dockerfile`.
pub fn file_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name == "Dockerfile" {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_string(),
        None => String::new(),
    }
}

/// File name with the final extension removed.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Whether a path looks like a test file in any of the common conventions.
pub fn is_test_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_stem(path);
    stem.ends_with("_test")
        || stem.starts_with("test_")
        || name.contains(".test.")
        || name.contains(".spec.")
        || path
            .split('/')
            .rev()
            .skip(1)
            .any(|dir| dir == "tests" || dir == "__tests__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_counts_lines() {
        let change = Change::new(
            "src/lib.rs",
            ChangeKind::Modify,
            "+++ b/src/lib.rs\n+fn a() {}\n+fn b() {}\n-fn c() {}\n",
        );
        assert_eq!(change.added, 2);
        assert_eq!(change.removed, 1);
        assert!(!change.is_major);
    }

    #[test]
    fn test_change_major_threshold() {
        let change = Change::with_counts("a.go", ChangeKind::Modify, "", 300, 200);
        assert!(change.is_major);
        let change = Change::with_counts("a.go", ChangeKind::Modify, "", 300, 199);
        assert!(!change.is_major);
    }

    #[test]
    fn test_file_extension_edge_cases() {
        assert_eq!(file_extension("internal/parser/git.go"), "go");
        assert_eq!(file_extension(".env"), "env");
        assert_eq!(file_extension("deploy/Dockerfile"), "Dockerfile");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("internal/parser/git.go"), "git");
        assert_eq!(file_stem(".env"), ".env");
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path("internal/parser/git_test.go"));
        assert!(is_test_path("tests/test_parser.py"));
        assert!(is_test_path("src/app.spec.ts"));
        assert!(is_test_path("tests/analyzer_test.rs"));
        assert!(is_test_path("tests/helpers.rs"));
        assert!(!is_test_path("src/testing.rs"));
        assert!(!is_test_path("internal/parser/git.go"));
    }

    #[test]
    fn test_rename_records_source_and_target() {
        let change = Change::renamed("src/old.rs", "src/new.rs", "");
        assert_eq!(change.kind, ChangeKind::Rename);
        assert_eq!(change.path, "src/new.rs");
        assert_eq!(change.source.as_deref(), Some("src/old.rs"));
        assert_eq!(change.target.as_deref(), Some("src/new.rs"));
    }

    #[test]
    fn test_dependency_detection() {
        assert!(Change::new("go.mod", ChangeKind::Modify, "").is_root_manifest());
        assert!(!Change::new("tools/go.mod", ChangeKind::Modify, "").is_root_manifest());
        assert!(Change::new("Cargo.lock", ChangeKind::Modify, "").is_dependency_file());
        assert!(!Change::new("src/main.rs", ChangeKind::Modify, "").is_dependency_file());
    }

    #[test]
    fn test_kind_codes() {
        for kind in [
            ChangeKind::Add,
            ChangeKind::Modify,
            ChangeKind::Delete,
            ChangeKind::Rename,
            ChangeKind::Copy,
        ] {
            assert_eq!(ChangeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ChangeKind::from_code('X'), None);
    }
}
