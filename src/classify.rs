//! Heuristic service-category classification from free-text column values.
//!
//! Deliberately loose: word-boundary regexes mixed with starts-with and
//! substring checks, matching how sheet maintainers actually label rows. The
//! rules are an ordered list evaluated top to bottom; first match wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::aliases;
use crate::record::{Category, RawRecord};

static HRT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bHRT\b").unwrap());
static SURGERY_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bSURGERY\b").unwrap());

struct Rule {
    label: Category,
    matches: fn(priority: &str, full: &str) -> bool,
}

/// Evaluated in priority order; HRT outranks surgery outranks therapy.
static RULES: &[Rule] = &[
    Rule {
        label: Category::Hrt,
        matches: |p, f| token_match(&HRT_WORD, "HRT", p, f),
    },
    Rule {
        label: Category::Surgery,
        matches: |p, f| token_match(&SURGERY_WORD, "SURGERY", p, f),
    },
    Rule {
        label: Category::Therapy,
        matches: |p, f| p.contains("THERAPY") || f.contains("THERAPY"),
    },
];

fn token_match(word: &Regex, token: &str, priority: &str, full: &str) -> bool {
    word.is_match(priority)
        || word.is_match(full)
        || priority.starts_with(token)
        || priority.contains(&format!("{token} "))
}

/// Assign a category to one raw row.
///
/// Two uppercase haystacks are built: a priority string from the name,
/// category and url columns, and a full string from every column value.
pub fn classify(raw: &RawRecord) -> Category {
    let priority: String = [
        aliases::IDENTITY,
        aliases::CATEGORY,
        aliases::URL,
    ]
    .iter()
    .filter_map(|set| raw.first_non_empty(set))
    .collect::<Vec<_>>()
    .join(" ")
    .to_uppercase();

    let full: String = raw
        .iter()
        .map(|(_, v)| v)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    for rule in RULES {
        if (rule.matches)(&priority, &full) {
            return rule.label;
        }
    }
    Category::None
}
