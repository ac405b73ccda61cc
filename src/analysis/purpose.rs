//! Keyword-to-purpose lookup over diff text.

use std::collections::BTreeMap;

use crate::analysis::context::DEFAULT_PURPOSE;

/// Built-in keyword table, checked in order after the configured mappings.
const BUILTIN_PURPOSES: &[(&str, &str)] = &[
    ("login", "authentication"),
    ("auth", "authentication"),
    ("validation", "validation"),
    ("validate", "validation"),
    ("database", "database operations"),
    ("query", "database query"),
    ("sql", "database logic"),
    ("gorm", "database logic"),
    ("caching", "caching"),
    ("cache", "caching"),
    ("refactor", "code restructuring"),
    ("logging", "logging"),
    ("logger", "logging"),
    ("log", "logging"),
    ("readme", "documentation"),
    ("docs", "documentation"),
    ("middleware", "middleware"),
    ("tests", "testing"),
    ("test", "testing"),
    ("config", "configuration"),
    ("ci", "ci/cd"),
    ("hotfix", "bug fix"),
    ("bug", "bug fix"),
    ("fix", "bug fix"),
    ("cleanup", "code cleanup"),
    ("performance", "performance improvement"),
    ("perf", "performance improvement"),
    ("security", "security update"),
    ("dependency", "dependency update"),
    ("dep", "dependency update"),
    ("build", "build system"),
    ("style", "code style"),
    ("deserialize", "deserialization"),
    ("serialize", "serialization"),
    ("json", "data handling"),
    ("xml", "data handling"),
    ("async", "asynchronous operations"),
    ("await", "asynchronous operations"),
    ("concurrent", "concurrency"),
    ("parallel", "parallel processing"),
    ("endpoint", "api endpoints"),
    ("api", "api endpoints"),
    ("route", "routing"),
    ("frontend", "user interface"),
    ("ui", "user interface"),
    ("backend", "backend logic"),
    ("server", "server logic"),
    ("client", "client logic"),
    ("docker", "docker configuration"),
    ("kubernetes", "kubernetes configuration"),
    ("k8s", "kubernetes configuration"),
    ("aws", "aws integration"),
    ("gcp", "gcp integration"),
    ("azure", "azure integration"),
    ("exception", "error handling"),
    ("error", "error handling"),
    ("user", "user management"),
    ("feat", "new feature"),
];

/// Keywords at or below this length only match as whole words.
const SHORT_KEYWORD_LEN: usize = 3;

/// Derive a purpose phrase from diff text.
pub fn determine_purpose(diff: &str, keyword_mappings: &BTreeMap<String, String>) -> String {
    let haystack = diff.to_lowercase();

    let mut configured: Vec<(&String, &String)> = keyword_mappings
        .iter()
        .filter(|(keyword, _)| !keyword.is_empty())
        .collect();
    // BTreeMap order already breaks ties alphabetically; the sort is stable.
    configured.sort_by_key(|(keyword, _)| std::cmp::Reverse(keyword.len()));

    for (keyword, purpose) in configured {
        if contains_keyword(&haystack, &keyword.to_lowercase()) {
            return purpose.clone();
        }
    }

    BUILTIN_PURPOSES
        .iter()
        .find(|(keyword, _)| contains_keyword(&haystack, keyword))
        .map(|(_, purpose)| purpose.to_string())
        .unwrap_or_else(|| DEFAULT_PURPOSE.to_string())
}

/// Substring match, requiring word boundaries for short keywords.
pub(crate) fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.len() > SHORT_KEYWORD_LEN {
        return haystack.contains(keyword);
    }
    haystack.match_indices(keyword).any(|(start, _)| {
        let end = start + keyword.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_purpose() {
        assert_eq!(determine_purpose("+x := 1\n", &BTreeMap::new()), "general update");
    }

    #[test]
    fn test_builtin_table_order() {
        assert_eq!(
            determine_purpose("+if err := validate(user); err != nil {\n", &BTreeMap::new()),
            "validation"
        );
        assert_eq!(determine_purpose("+cache.Put(k, v)\n", &BTreeMap::new()), "caching");
    }

    #[test]
    fn test_short_keywords_need_word_boundaries() {
        // "ci" inside "decision" and "ui" inside "build" must not match.
        assert_eq!(determine_purpose("+decision := guide\n", &BTreeMap::new()), "general update");
        assert_eq!(determine_purpose("+run: ci pipeline\n", &BTreeMap::new()), "ci/cd");
    }

    #[test]
    fn test_configured_mappings_win_longest_first() {
        let mut mappings = BTreeMap::new();
        mappings.insert("pay".to_string(), "payments".to_string());
        mappings.insert("payment gateway".to_string(), "gateway integration".to_string());
        assert_eq!(
            determine_purpose("+// payment gateway retries\n", &mappings),
            "gateway integration"
        );
        assert_eq!(determine_purpose("+pay(order)\n", &mappings), "payments");
    }

    #[test]
    fn test_configured_mapping_is_case_insensitive() {
        let mut mappings = BTreeMap::new();
        mappings.insert("Ledger".to_string(), "accounting".to_string());
        assert_eq!(determine_purpose("+LEDGER.append(x)\n", &mappings), "accounting");
    }

    #[test]
    fn test_contains_keyword() {
        assert!(contains_keyword("fix the bug", "bug"));
        assert!(!contains_keyword("debugger", "bug"));
        assert!(contains_keyword("the debugger", "debugger"));
    }
}
