//! Heuristic classification of task prompts into singleton kinds.
//!
//! The rules are an ordered, data-driven table evaluated to first match, so
//! adding an operation kind means adding a row, not control flow. Matching
//! is case-insensitive: literal substrings first (package-manager
//! invocations and the like), then a looser phrase pattern per kind.
//!
//! Classification is a fallback. An explicit per-node tag from the task
//! decomposer always takes precedence; the conflict detector enforces that
//! ordering.

use super::types::SingletonKind;
use regex::Regex;
use std::sync::LazyLock;

/// One classification rule: literal needles plus an optional phrase
/// pattern, all matched against the lowercased prompt.
struct Rule {
    kind: SingletonKind,
    needles: &'static [&'static str],
    phrase: Option<&'static str>,
}

/// Ordered rule table; first match wins.
static RULES: &[Rule] = &[
    Rule {
        kind: SingletonKind::Build,
        needles: &["npm run build", "yarn build", "pnpm build", "bun build", "cargo build"],
        phrase: Some(r"\bbuild\b.*\bproject\b"),
    },
    Rule {
        kind: SingletonKind::Lint,
        needles: &["npm run lint", "yarn lint", "eslint", "cargo clippy"],
        phrase: Some(r"\blint\b.*\bcode\b"),
    },
    Rule {
        kind: SingletonKind::Test,
        needles: &["npm test", "yarn test", "jest", "vitest", "cargo test"],
        phrase: Some(r"\btest\b.*\bsuite\b"),
    },
    Rule {
        kind: SingletonKind::Typecheck,
        needles: &["typecheck", "tsc --noemit"],
        phrase: None,
    },
    Rule {
        kind: SingletonKind::Install,
        needles: &["npm install", "yarn install", "pnpm install", "cargo add"],
        phrase: Some(r"\binstall\b.*\bdependencies\b"),
    },
    Rule {
        kind: SingletonKind::Deploy,
        needles: &["deploy"],
        phrase: None,
    },
];

/// Compiled phrase patterns, in rule order; `None` where a rule has none.
static PHRASES: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| rule.phrase.map(|p| Regex::new(p).expect("static phrase pattern")))
        .collect()
});

/// Infer the singleton kind of a free-text task prompt, if any.
///
/// Returns `None` when no rule matches; such a task is assumed safe to run
/// alongside others (file conflicts permitting).
pub fn classify(text: &str) -> Option<SingletonKind> {
    let lowered = text.to_lowercase();

    for (rule, phrase) in RULES.iter().zip(PHRASES.iter()) {
        if rule.needles.iter().any(|needle| lowered.contains(needle)) {
            return Some(rule.kind);
        }

        if let Some(re) = phrase
            && re.is_match(&lowered)
        {
            return Some(rule.kind);
        }
    }

    None
}
