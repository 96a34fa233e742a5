//! Path normalization and comparison for conflict analysis.
//!
//! The lock manager and the conflict detector's file pass must agree on
//! resource identity, so both route every path through [`normalize`] before
//! comparing or storing it. Wildcard comparison is a best-effort secondary
//! capability: false negatives are tolerated, false positives are not.

use regex::Regex;

/// Normalize a file path for consistent comparison.
///
/// Applies one rule everywhere: trim whitespace, fold `\` separators to `/`,
/// strip a leading `./`, collapse duplicate separators, and lowercase.
pub fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/").to_lowercase();

    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }

    if let Some(stripped) = normalized.strip_prefix("./") {
        normalized = stripped.to_string();
    }

    normalized
}

/// Check whether two paths could refer to the same resource.
///
/// Exact normalized comparison is tried first. If either path contains a
/// `*` wildcard, it is treated as matching any substring and tested in both
/// directions.
pub fn paths_conflict(a: &str, b: &str) -> bool {
    let norm_a = normalize(a);
    let norm_b = normalize(b);

    if norm_a == norm_b {
        return true;
    }

    if norm_a.contains('*') || norm_b.contains('*') {
        return wildcard_matches(&norm_a, &norm_b) || wildcard_matches(&norm_b, &norm_a);
    }

    false
}

/// Test whether `candidate` matches `pattern`, where `*` in the pattern
/// matches any substring. Literal segments are regex-escaped.
fn wildcard_matches(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return false;
    }

    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    let regex_src = format!("^{}$", escaped.join(".*"));

    // The source is built from escaped literals and `.*`, so compilation
    // cannot fail on user input; fall back to no-match if it somehow does.
    match Regex::new(&regex_src) {
        Ok(re) => re.is_match(candidate),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_separators_and_case() {
        assert_eq!(normalize("src\\Lib\\Mod.rs"), "src/lib/mod.rs");
        assert_eq!(normalize("  src/a.ts "), "src/a.ts");
        assert_eq!(normalize("./src//a.ts"), "src/a.ts");
    }

    #[test]
    fn identical_paths_conflict() {
        assert!(paths_conflict("src/a.ts", "SRC\\a.ts"));
        assert!(!paths_conflict("src/a.ts", "src/b.ts"));
    }

    #[test]
    fn wildcard_matches_any_substring() {
        assert!(paths_conflict("src/*.ts", "src/a.ts"));
        assert!(paths_conflict("src/*", "src/deep/nested.rs"));
        assert!(paths_conflict("src/a.ts", "src/*.ts"));
        assert!(!paths_conflict("src/*.ts", "lib/a.ts"));
    }

    #[test]
    fn wildcard_does_not_treat_literals_as_regex() {
        // A dot in the pattern must stay a literal dot.
        assert!(!paths_conflict("src/a.ts", "src/axts"));
        assert!(!paths_conflict("src/*.ts", "src/a_ts"));
    }
}
