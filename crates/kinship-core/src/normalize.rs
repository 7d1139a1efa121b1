//! Name normalization.
//!
//! Survey answers name people loosely: "Karen og Tomas", "Ninna & Jesper",
//! "Alice and Bob", "Jens, Rita". Everything that compares names goes through
//! this module so that the Danish and English conjunctions, stray punctuation
//! and irregular spacing never decide whether two names match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinating conjunctions that join two people in one field.
///
/// Matched as whole whitespace-separated tokens, case-insensitively.
const CONJUNCTIONS: &[&str] = &["og", "and", "&"];

/// Field value meaning "no parents given".
const NO_PARENTS_SENTINEL: &str = "-";

/// Fallback id slug for names with no ASCII-representable characters.
const EMPTY_SLUG: &str = "person";

/// The join key between free-text names and resolved people.
///
/// Lower-cased, conjunction-free, whitespace-collapsed. Two different people
/// with the same name share a key; callers must treat keys as non-unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameKey(String);

impl NameKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NameKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_conjunction(token: &str) -> bool {
    CONJUNCTIONS.iter().any(|c| token.eq_ignore_ascii_case(c))
}

/// Canonicalizes a raw name (or couple) string into a [`NameKey`].
///
/// Lower-cases, drops conjunction tokens, strips commas and semicolons and
/// collapses whitespace.
pub fn normalize(raw: &str) -> NameKey {
    let lowered: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| *c != ',' && *c != ';')
        .collect();

    let key = lowered
        .split_whitespace()
        .filter(|token| !is_conjunction(token))
        .collect::<Vec<_>>()
        .join(" ");

    NameKey(key)
}

/// Splits a names field into individual candidate names.
///
/// Separators are `,`, `;` and the conjunctions `og`, `&`, `and`. Candidates
/// are trimmed with inner whitespace collapsed; empty candidates are dropped.
pub fn split_multi_name(raw: &str) -> Vec<String> {
    let mut names = Vec::new();

    for piece in raw.split([',', ';']) {
        let mut current: Vec<&str> = Vec::new();
        for token in piece.split_whitespace() {
            if is_conjunction(token) {
                push_candidate(&mut names, &mut current);
            } else {
                current.push(token);
            }
        }
        push_candidate(&mut names, &mut current);
    }

    names
}

fn push_candidate(names: &mut Vec<String>, tokens: &mut Vec<&str>) {
    if !tokens.is_empty() {
        names.push(tokens.join(" "));
        tokens.clear();
    }
}

/// Splits a parents field into parent names.
///
/// `-`, empty and whitespace-only fields mean "no parents" and yield an empty
/// list, never a single empty candidate.
pub fn parent_candidates(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_PARENTS_SENTINEL {
        return Vec::new();
    }

    split_multi_name(trimmed)
        .into_iter()
        .filter(|name| name != NO_PARENTS_SENTINEL)
        .collect()
}

/// Derives the URL-safe id slug for a person name.
///
/// Danish letters are transliterated (`æ` → `ae`, `ø` → `oe`, `å` → `aa`);
/// any other non-alphanumeric run becomes a single `-`.
pub fn person_id_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        match c {
            'æ' => slug.push_str("ae"),
            'ø' => slug.push_str("oe"),
            'å' => slug.push_str("aa"),
            c if c.is_ascii_alphanumeric() => slug.push(c),
            _ => {
                if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
        }
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_conjunctions() {
        assert_eq!(normalize("Karen og Tomas").as_str(), "karen tomas");
        assert_eq!(normalize("Ninna & Jesper").as_str(), "ninna jesper");
        assert_eq!(normalize("Alice AND Bob").as_str(), "alice bob");
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(normalize("  Paul   Erik ; ").as_str(), "paul erik");
        assert_eq!(normalize("Jens,Rita").as_str(), "jensrita");
        assert_eq!(normalize("Jens, Rita").as_str(), "jens rita");
    }

    #[test]
    fn test_normalize_keeps_conjunction_inside_words() {
        // "Bogart" contains "og" but is not the token "og"
        assert_eq!(normalize("Bogart").as_str(), "bogart");
        assert_eq!(normalize("Anders").as_str(), "anders");
    }

    #[test]
    fn test_normalize_lowercases_danish_letters() {
        assert_eq!(normalize("Bjørn ÅGE").as_str(), "bjørn åge");
    }

    #[test]
    fn test_split_multi_name() {
        assert_eq!(split_multi_name("Alice og Erik"), vec!["Alice", "Erik"]);
        assert_eq!(
            split_multi_name("Anna Lisbeth & Jan"),
            vec!["Anna Lisbeth", "Jan"]
        );
        assert_eq!(split_multi_name("A, B; C and D"), vec!["A", "B", "C", "D"]);
        assert_eq!(split_multi_name("Thomas"), vec!["Thomas"]);
    }

    #[test]
    fn test_split_multi_name_drops_empty_candidates() {
        assert!(split_multi_name("").is_empty());
        assert!(split_multi_name(" , ; ").is_empty());
        assert_eq!(split_multi_name("og Erik,"), vec!["Erik"]);
    }

    #[test]
    fn test_split_multi_name_collapses_inner_whitespace() {
        assert_eq!(
            split_multi_name("  Mikkel   Asbjørn og Mathilde "),
            vec!["Mikkel Asbjørn", "Mathilde"]
        );
    }

    #[test]
    fn test_parent_candidates_sentinels() {
        assert!(parent_candidates("-").is_empty());
        assert!(parent_candidates("  - ").is_empty());
        assert!(parent_candidates("").is_empty());
        assert!(parent_candidates("   ").is_empty());
        assert_eq!(parent_candidates("Alice og Erik"), vec!["Alice", "Erik"]);
    }

    #[test]
    fn test_person_id_slug() {
        assert_eq!(person_id_slug("Niels Peter"), "niels-peter");
        assert_eq!(person_id_slug("Bjørn"), "bjoern");
        assert_eq!(person_id_slug("Åse Mæhle"), "aase-maehle");
        assert_eq!(person_id_slug("  O'Brien  "), "o-brien");
        assert_eq!(person_id_slug("---"), "person");
    }
}
